//! Feishu contact API data models

use serde::{Deserialize, Serialize};

use crate::directory::identifier::IdKind;
use crate::directory::paging::PaginatedResponse;
use crate::directory::transport::ApiStatus;
use crate::directory::tree::{build_tree_by, DepartmentNode};
use crate::directory::walker::{WalkedDepartment, WalkedUser};
use crate::error::{OrgError, Result};

/// Standard `{code, msg, data}` response wrapper
#[derive(Deserialize, Debug)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiStatus for Envelope<T> {
    fn code(&self) -> i64 {
        self.code
    }

    fn message(&self) -> &str {
        &self.msg
    }
}

impl<T> Envelope<T> {
    /// Check the code and return the payload
    pub fn into_data(self, context: &str) -> Result<T> {
        self.check()?;
        self.data
            .ok_or_else(|| OrgError::Json(format!("Response for {} has no data", context)))
    }
}

/// Tenant access token response (not wrapped in `data`)
#[derive(Deserialize, Debug)]
pub struct TenantTokenResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub tenant_access_token: String,
    /// Validity in seconds
    #[serde(default)]
    pub expire: i64,
}

impl ApiStatus for TenantTokenResponse {
    fn code(&self) -> i64 {
        self.code
    }

    fn message(&self) -> &str {
        &self.msg
    }
}

/// One page of a cursor listing
#[derive(Deserialize, Debug)]
pub struct ListData<T> {
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub page_token: Option<String>,
    #[serde(default = "Option::default")]
    pub items: Option<Vec<T>>,
}

impl<T> PaginatedResponse for ListData<T> {
    type Item = T;

    fn has_more(&self) -> bool {
        self.has_more
    }

    fn next_page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }

    fn into_data(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}

#[derive(Deserialize, Debug)]
pub struct DepartmentData {
    pub department: Department,
}

#[derive(Deserialize, Debug)]
pub struct UserData {
    pub user: User,
}

/// Localised department names
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct I18nName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zh_cn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ja_jp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_us: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct DepartmentStatus {
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DepartmentLeader {
    #[serde(rename = "leaderType", default)]
    pub leader_type: i32,
    #[serde(rename = "leaderID", default)]
    pub leader_id: String,
}

/// Department record from `/contact/v3/departments`
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Department {
    #[serde(default)]
    pub department_id: String,
    #[serde(default)]
    pub open_department_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n_name: Option<I18nName>,
    #[serde(default)]
    pub parent_department_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_member_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DepartmentStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leaders: Vec<DepartmentLeader>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub department_hrbps: Vec<String>,
}

impl Department {
    /// Id in the requested id space
    pub fn id(&self, kind: IdKind) -> &str {
        match kind {
            IdKind::Stable => &self.department_id,
            IdKind::Scoped => &self.open_department_id,
        }
    }

    pub fn en_name(&self) -> &str {
        self.i18n_name
            .as_ref()
            .and_then(|n| n.en_us.as_deref())
            .unwrap_or("")
    }

    pub fn leader(&self) -> &str {
        self.leader_user_id.as_deref().unwrap_or("")
    }

    pub fn member_count(&self) -> u64 {
        self.member_count.unwrap_or(0)
    }

    pub fn is_deleted(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.is_deleted)
    }

    pub fn is_root(&self) -> bool {
        self.parent_department_id.is_empty()
            || self.parent_department_id == crate::config::feishu::ROOT_PARENT_ID
    }
}

/// Link a department listing into a forest.
///
/// `parent_department_id` is returned in the id space the listing was
/// requested with, so nodes are keyed on `kind` as well.
pub fn department_tree(
    departments: Vec<Department>,
    kind: IdKind,
) -> Vec<DepartmentNode<Department, User>> {
    build_tree_by(
        departments,
        |d| d.id(kind).to_string(),
        |d| d.parent_department_id.clone(),
    )
}

impl WalkedDepartment for Department {
    fn department_id(&self, kind: IdKind) -> &str {
        self.id(kind)
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn leader_id(&self) -> Option<&str> {
        self.leader_user_id.as_deref()
    }
}

/// Account state flags; several may be set at once
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct UserStatus {
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default)]
    pub is_resigned: bool,
    #[serde(default)]
    pub is_activated: bool,
    #[serde(default)]
    pub is_exited: bool,
    #[serde(default)]
    pub is_unjoin: bool,
}

impl UserStatus {
    /// Names of the flags that are set
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.is_activated {
            labels.push("activated");
        }
        if self.is_frozen {
            labels.push("frozen");
        }
        if self.is_resigned {
            labels.push("resigned");
        }
        if self.is_exited {
            labels.push("exited");
        }
        if self.is_unjoin {
            labels.push("unjoined");
        }
        labels
    }
}

/// User record from `/contact/v3/users`
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct User {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub open_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub department_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_tenant_manager: Option<bool>,
}

impl User {
    /// Id in the requested id space
    pub fn id(&self, kind: IdKind) -> &str {
        match kind {
            IdKind::Stable => &self.user_id,
            IdKind::Scoped => &self.open_id,
        }
    }

    pub fn gender_label(&self) -> &'static str {
        match self.gender {
            Some(1) => "male",
            Some(2) => "female",
            _ => "unknown",
        }
    }

    pub fn status_label(&self) -> String {
        self.status
            .as_ref()
            .map(|s| s.labels().join(","))
            .unwrap_or_default()
    }

    pub fn mobile(&self) -> &str {
        self.mobile.as_deref().unwrap_or("")
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }

    pub fn enterprise_email(&self) -> &str {
        self.enterprise_email.as_deref().unwrap_or("")
    }

    pub fn job_title(&self) -> &str {
        self.job_title.as_deref().unwrap_or("")
    }

    pub fn is_tenant_manager(&self) -> bool {
        self.is_tenant_manager.unwrap_or(false)
    }
}

impl WalkedUser for User {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// One page of `/contact/v3/scopes`
#[derive(Deserialize, Debug, Default)]
pub struct ScopeData {
    #[serde(default)]
    pub department_ids: Vec<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub page_token: Option<String>,
}

/// A single id granted by the app's authorization scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEntry {
    Department(String),
    User(String),
    Group(String),
}

impl PaginatedResponse for ScopeData {
    type Item = ScopeEntry;

    fn has_more(&self) -> bool {
        self.has_more
    }

    fn next_page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }

    fn into_data(self) -> Vec<ScopeEntry> {
        self.department_ids
            .into_iter()
            .map(ScopeEntry::Department)
            .chain(self.user_ids.into_iter().map(ScopeEntry::User))
            .chain(self.group_ids.into_iter().map(ScopeEntry::Group))
            .collect()
    }
}

/// Id with a best-effort display name (empty when lookup failed)
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScopeItem {
    pub id: String,
    pub name: String,
}

/// Department with the names of the departments and users it refers to
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DepartmentWithNames {
    #[serde(flatten)]
    pub department: Department,
    pub parent_name: String,
    pub leader_name: String,
    pub leader_names: Vec<ScopeItem>,
}

/// User with the names of the departments it belongs to
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserWithDepartments {
    #[serde(flatten)]
    pub user: User,
    pub departments: Vec<ScopeItem>,
}

/// `name (id)`, or just the id when the name is unknown
pub fn named(id: &str, name: &str) -> String {
    if name.is_empty() {
        id.to_string()
    } else {
        format!("{} ({})", name, id)
    }
}

/// Departments, users and groups the app is allowed to see
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthScope {
    pub departments: Vec<ScopeItem>,
    pub users: Vec<ScopeItem>,
    pub groups: Vec<ScopeItem>,
}

impl AuthScope {
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty() && self.users.is_empty() && self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_deserialize() {
        let dept: Department = serde_json::from_value(serde_json::json!({
            "department_id": "D096",
            "open_department_id": "od-4e6ac4d14bcd5071a37a39de902c7141",
            "name": "Engineering",
            "i18n_name": {"zh_cn": "研发", "en_us": "Engineering"},
            "parent_department_id": "0",
            "leader_user_id": "ou_7dab8a3d3cdcc9da365777c7ad535d62",
            "member_count": 42,
            "status": {"is_deleted": false},
            "leaders": [{"leaderType": 1, "leaderID": "ou_7dab8a3d3cdcc9da365777c7ad535d62"}]
        }))
        .unwrap();

        assert_eq!(dept.id(IdKind::Stable), "D096");
        assert!(dept.id(IdKind::Scoped).starts_with("od-"));
        assert_eq!(dept.en_name(), "Engineering");
        assert_eq!(dept.member_count(), 42);
        assert!(dept.is_root());
        assert!(!dept.is_deleted());
        assert_eq!(dept.leaders[0].leader_type, 1);
    }

    #[test]
    fn test_department_minimal() {
        let dept: Department =
            serde_json::from_value(serde_json::json!({"name": "Ops", "parent_department_id": "D1"}))
                .unwrap();
        assert_eq!(dept.en_name(), "");
        assert_eq!(dept.leader(), "");
        assert_eq!(dept.member_count(), 0);
        assert!(!dept.is_root());
    }

    #[test]
    fn test_user_deserialize() {
        let user: User = serde_json::from_value(serde_json::json!({
            "user_id": "u-100",
            "open_id": "ou_100",
            "name": "Zhang San",
            "mobile": "+8613800000000",
            "gender": 1,
            "status": {"is_activated": true, "is_frozen": true},
            "department_ids": ["D096", "D097"],
            "is_tenant_manager": true
        }))
        .unwrap();

        assert_eq!(user.id(IdKind::Stable), "u-100");
        assert_eq!(user.id(IdKind::Scoped), "ou_100");
        assert_eq!(user.gender_label(), "male");
        assert_eq!(user.status_label(), "activated,frozen");
        assert_eq!(user.department_ids.len(), 2);
        assert!(user.is_tenant_manager());
        assert_eq!(user.email(), "");
    }

    #[test]
    fn test_envelope_error() {
        let env: Envelope<DepartmentData> = serde_json::from_value(serde_json::json!({
            "code": 40014,
            "msg": "no dept authority error"
        }))
        .unwrap();
        match env.into_data("department") {
            Err(OrgError::Api { code, message }) => {
                assert_eq!(code, 40014);
                assert_eq!(message, "no dept authority error");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_missing_data() {
        let env: Envelope<DepartmentData> =
            serde_json::from_value(serde_json::json!({"code": 0, "msg": "success"})).unwrap();
        assert!(matches!(env.into_data("department"), Err(OrgError::Json(_))));
    }

    #[test]
    fn test_list_data_without_items() {
        let page: ListData<User> =
            serde_json::from_value(serde_json::json!({"has_more": false})).unwrap();
        assert!(!page.has_more());
        assert!(page.into_data().is_empty());
    }

    #[test]
    fn test_scope_entries_order() {
        let data: ScopeData = serde_json::from_value(serde_json::json!({
            "department_ids": ["D1"],
            "user_ids": ["u1", "u2"],
            "group_ids": ["g1"],
            "has_more": false
        }))
        .unwrap();
        assert_eq!(
            data.into_data(),
            vec![
                ScopeEntry::Department("D1".to_string()),
                ScopeEntry::User("u1".to_string()),
                ScopeEntry::User("u2".to_string()),
                ScopeEntry::Group("g1".to_string()),
            ]
        );
    }

    #[test]
    fn test_department_tree_keys_on_scoped_ids() {
        let page: ListData<Department> = serde_json::from_value(serde_json::json!({
            "has_more": false,
            "items": [
                {"department_id": "D2", "open_department_id": "od-2",
                 "parent_department_id": "od-1", "name": "Eng"},
                {"department_id": "D3", "open_department_id": "od-3",
                 "parent_department_id": "od-2", "name": "Infra"},
                {"department_id": "D4", "open_department_id": "od-4",
                 "parent_department_id": "od-1", "name": "Sales"}
            ]
        }))
        .unwrap();

        let forest = department_tree(page.into_data(), IdKind::Scoped);

        let roots: Vec<&str> = forest.iter().map(|n| n.department.name.as_str()).collect();
        assert_eq!(roots, vec!["Eng", "Sales"]);
        assert_eq!(forest[0].children[0].department.name, "Infra");

        // The same listing keyed on stable ids links nothing
        let flat = department_tree(
            vec![forest[0].department.clone(), forest[0].children[0].department.clone()],
            IdKind::Stable,
        );
        assert_eq!(flat.len(), 2);
    }
}
