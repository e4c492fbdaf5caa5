//! Feishu contact API operations

use log::debug;

use crate::config::feishu;
use crate::directory::identifier::{IdKind, IdSelectors, Identifier};
use crate::directory::transport::query_string;
use crate::directory::walker::DirectorySource;
use crate::error::{OrgError, Result};

use super::client::FeishuClient;
use super::models::{
    AuthScope, Department, DepartmentData, DepartmentWithNames, ListData, ScopeData, ScopeEntry,
    ScopeItem, User, UserData, UserWithDepartments,
};

impl FeishuClient {
    /// Get a department by id
    pub async fn department(&self, id: &Identifier, user_kind: IdKind) -> Result<Department> {
        let value = id.require("department id")?;
        let path = format!(
            "{}/{}?{}",
            feishu::DEPARTMENTS,
            id.encoded(),
            query_string(&[
                ("department_id_type", id.kind.department_id_type()),
                ("user_id_type", user_kind.user_id_type()),
            ])
        );
        let data: DepartmentData = self
            .get_data(&path, &format!("department '{}'", value))
            .await?;
        Ok(data.department)
    }

    /// List the sub-departments of a department (all descendants when `recursive`)
    pub async fn child_departments(
        &self,
        id: &Identifier,
        user_kind: IdKind,
        recursive: bool,
    ) -> Result<Vec<Department>> {
        let value = id.require("department id")?;
        let page_size = feishu::PAGE_SIZE.to_string();
        let path = format!(
            "{}/{}/children?{}",
            feishu::DEPARTMENTS,
            id.encoded(),
            query_string(&[
                ("department_id_type", id.kind.department_id_type()),
                ("user_id_type", user_kind.user_id_type()),
                ("fetch_child", if recursive { "true" } else { "false" }),
                ("page_size", &page_size),
            ])
        );
        self.fetch_all_pages::<ListData<Department>>(
            &path,
            &format!("children of department '{}'", value),
        )
        .await
    }

    /// Get a user by id
    pub async fn user(&self, id: &Identifier, department_kind: IdKind) -> Result<User> {
        let value = id.require("user id")?;
        let path = format!(
            "{}/{}?{}",
            feishu::USERS,
            id.encoded(),
            query_string(&[
                ("user_id_type", id.kind.user_id_type()),
                ("department_id_type", department_kind.department_id_type()),
            ])
        );
        let data: UserData = self.get_data(&path, &format!("user '{}'", value)).await?;
        Ok(data.user)
    }

    /// List users directly assigned to a department
    pub async fn users_by_department(
        &self,
        department: &Identifier,
        user_kind: IdKind,
    ) -> Result<Vec<User>> {
        let value = department.require("department id")?;
        let page_size = feishu::PAGE_SIZE.to_string();
        let path = format!(
            "{}?{}",
            feishu::USERS_BY_DEPARTMENT,
            query_string(&[
                ("department_id", value),
                ("department_id_type", department.kind.department_id_type()),
                ("user_id_type", user_kind.user_id_type()),
                ("page_size", &page_size),
            ])
        );
        self.fetch_all_pages::<ListData<User>>(&path, &format!("users of department '{}'", value))
            .await
    }

    /// List everything the app may see, resolving names where possible.
    ///
    /// A failed name lookup leaves that entry's name empty.
    pub async fn auth_scope(&self, ids: IdSelectors) -> Result<AuthScope> {
        let page_size = feishu::SCOPE_PAGE_SIZE.to_string();
        let path = format!(
            "{}?{}",
            feishu::SCOPES,
            query_string(&[
                ("department_id_type", ids.department.department_id_type()),
                ("user_id_type", ids.user.user_id_type()),
                ("page_size", &page_size),
            ])
        );
        let entries = self
            .fetch_all_pages::<ScopeData>(&path, "auth scope")
            .await?;

        let mut scope = AuthScope::default();
        for entry in entries {
            match entry {
                ScopeEntry::Department(id) => {
                    let item = self.named_department(ids.department, id, ids.user).await;
                    scope.departments.push(item);
                }
                ScopeEntry::User(id) => {
                    let item = self.named_user(ids.user, id, ids.department).await;
                    scope.users.push(item);
                }
                ScopeEntry::Group(id) => scope.groups.push(ScopeItem {
                    id,
                    name: String::new(),
                }),
            }
        }
        Ok(scope)
    }

    /// Get a department and resolve its parent and leader names.
    ///
    /// Name lookups are best effort; a failed one leaves the name empty.
    pub async fn department_with_names(
        &self,
        id: &Identifier,
        user_kind: IdKind,
    ) -> Result<DepartmentWithNames> {
        let department = self.department(id, user_kind).await?;

        let parent_name = if department.is_root() {
            String::new()
        } else {
            let parent = department.parent_department_id.clone();
            self.named_department(id.kind, parent, user_kind).await.name
        };
        let leader_name = match department.leader_user_id.clone() {
            Some(leader) if !leader.is_empty() => {
                self.named_user(user_kind, leader, id.kind).await.name
            }
            _ => String::new(),
        };
        let mut leader_names = Vec::with_capacity(department.leaders.len());
        for leader in &department.leaders {
            let item = self
                .named_user(user_kind, leader.leader_id.clone(), id.kind)
                .await;
            leader_names.push(item);
        }

        Ok(DepartmentWithNames {
            department,
            parent_name,
            leader_name,
            leader_names,
        })
    }

    /// Get a user and resolve the names of its departments (best effort)
    pub async fn user_with_departments(
        &self,
        id: &Identifier,
        department_kind: IdKind,
    ) -> Result<UserWithDepartments> {
        let user = self.user(id, department_kind).await?;
        let mut departments = Vec::with_capacity(user.department_ids.len());
        for department_id in &user.department_ids {
            let item = self
                .named_department(department_kind, department_id.clone(), id.kind)
                .await;
            departments.push(item);
        }
        Ok(UserWithDepartments { user, departments })
    }

    async fn named_department(&self, kind: IdKind, id: String, user_kind: IdKind) -> ScopeItem {
        let name = match self
            .department(&Identifier::new(kind, id.as_str()), user_kind)
            .await
        {
            Ok(d) => d.name,
            Err(e) => {
                debug!("Could not resolve department {}: {}", id, e);
                String::new()
            }
        };
        ScopeItem { id, name }
    }

    async fn named_user(&self, kind: IdKind, id: String, department_kind: IdKind) -> ScopeItem {
        let name = match self
            .user(&Identifier::new(kind, id.as_str()), department_kind)
            .await
        {
            Ok(u) => u.name,
            Err(e) => {
                debug!("Could not resolve user {}: {}", id, e);
                String::new()
            }
        };
        ScopeItem { id, name }
    }

    /// Reset a user's enterprise mailbox password
    pub async fn reset_email_password(&self, user: &Identifier, password: &str) -> Result<()> {
        let value = user.require("user id")?;
        if password.is_empty() {
            return Err(OrgError::Validation("password must not be empty".to_string()));
        }
        let path = format!(
            "{}?{}",
            feishu::PASSWORD_RESET,
            query_string(&[("user_id_type", user.kind.user_id_type())])
        );
        let body = serde_json::json!({
            "password": {"ent_email_password": password},
            "user_id": value,
        });
        self.post_json(&path, &body, &format!("password reset for '{}'", value))
            .await
    }
}

impl DirectorySource for FeishuClient {
    type Department = Department;
    type User = User;

    async fn department(&self, id: &Identifier, user_kind: IdKind) -> Result<Department> {
        FeishuClient::department(self, id, user_kind).await
    }

    async fn user(&self, id: &Identifier, department_kind: IdKind) -> Result<User> {
        FeishuClient::user(self, id, department_kind).await
    }

    async fn users_in(&self, department: &Identifier, user_kind: IdKind) -> Result<Vec<User>> {
        self.users_by_department(department, user_kind).await
    }

    async fn children_of(
        &self,
        department: &Identifier,
        user_kind: IdKind,
    ) -> Result<Vec<Department>> {
        self.child_departments(department, user_kind, false).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::directory::feishu::client::test_support::*;
    use crate::directory::retry::RetryPolicy;
    use crate::directory::token::TokenCache;
    use crate::directory::feishu::models::department_tree;
    use crate::directory::tree::count_users;
    use crate::directory::walker::{WalkOptions, Walker};
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> FeishuClient {
        FeishuClient::test_client(&server.uri(), Arc::new(TokenCache::new()))
    }

    fn ok(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "msg": "success",
            "data": data
        }))
    }

    fn dept_json(id: &str, parent: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "department_id": id,
            "open_department_id": format!("od-{}", id),
            "parent_department_id": parent,
            "name": name
        })
    }

    async fn mount_department(server: &MockServer, id: &str, parent: &str, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/contact/v3/departments/{}", id)))
            .respond_with(ok(serde_json::json!({"department": dept_json(id, parent, name)})))
            .mount(server)
            .await;
    }

    async fn mount_children(server: &MockServer, id: &str, children: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/contact/v3/departments/{}/children", id)))
            .respond_with(ok(serde_json::json!({"has_more": false, "items": children})))
            .mount(server)
            .await;
    }

    async fn mount_users(server: &MockServer, department: &str, users: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path("/contact/v3/users/find_by_department"))
            .and(query_param("department_id", department))
            .respond_with(ok(serde_json::json!({"has_more": false, "items": users})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_get_department() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/departments/D096"))
            .and(query_param("department_id_type", "department_id"))
            .and(query_param("user_id_type", "open_id"))
            .respond_with(ok(serde_json::json!({
                "department": {
                    "department_id": "D096",
                    "name": "Engineering",
                    "parent_department_id": "0",
                    "leader_user_id": "ou_lead"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dept = client(&server)
            .department(&Identifier::stable("D096"), IdKind::Scoped)
            .await
            .unwrap();

        assert_eq!(dept.name, "Engineering");
        assert_eq!(dept.leader(), "ou_lead");
        assert!(dept.is_root());
    }

    #[tokio::test]
    async fn test_scoped_department_id_sets_query() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/departments/od-123"))
            .and(query_param("department_id_type", "open_department_id"))
            .and(query_param("user_id_type", "user_id"))
            .respond_with(ok(serde_json::json!({"department": dept_json("D1", "0", "Root")})))
            .expect(1)
            .mount(&server)
            .await;

        let dept = client(&server)
            .department(&Identifier::scoped("od-123"), IdKind::Stable)
            .await
            .unwrap();
        assert_eq!(dept.department_id, "D1");
    }

    #[tokio::test]
    async fn test_empty_id_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let c = client(&server);
        assert!(matches!(
            c.department(&Identifier::stable(""), IdKind::Stable).await,
            Err(OrgError::Validation(_))
        ));
        assert!(matches!(
            c.users_by_department(&Identifier::stable(" "), IdKind::Stable)
                .await,
            Err(OrgError::Validation(_))
        ));
        assert!(matches!(
            c.user(&Identifier::scoped(""), IdKind::Stable).await,
            Err(OrgError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_children_follow_page_token() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;

        let children_path = "/contact/v3/departments/D1/children";
        Mock::given(method("GET"))
            .and(path(children_path))
            .and(query_param_is_missing("page_token"))
            .and(query_param("page_size", "50"))
            .respond_with(ok(serde_json::json!({
                "has_more": true,
                "page_token": "p2",
                "items": [dept_json("A", "D1", "a"), dept_json("B", "D1", "b")]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(children_path))
            .and(query_param("page_token", "p2"))
            .respond_with(ok(serde_json::json!({
                "has_more": true,
                "page_token": "p3",
                "items": [dept_json("C", "D1", "c")]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(children_path))
            .and(query_param("page_token", "p3"))
            .respond_with(ok(serde_json::json!({
                "has_more": false,
                "items": [dept_json("D", "D1", "d"), dept_json("E", "D1", "e")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let children = client(&server)
            .child_departments(&Identifier::stable("D1"), IdKind::Stable, false)
            .await
            .unwrap();

        let ids: Vec<&str> = children.iter().map(|d| d.department_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn test_recursive_children_sets_fetch_child() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/departments/D1/children"))
            .and(query_param("fetch_child", "true"))
            .respond_with(ok(serde_json::json!({"has_more": false})))
            .expect(1)
            .mount(&server)
            .await;

        let children = client(&server)
            .child_departments(&Identifier::stable("D1"), IdKind::Stable, true)
            .await
            .unwrap();
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn test_users_by_department_api_error() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/users/find_by_department"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 40004,
                "msg": "no dept authority error"
            })))
            .mount(&server)
            .await;

        let result = client(&server)
            .users_by_department(&Identifier::stable("D1"), IdKind::Stable)
            .await;
        match result {
            Err(OrgError::Api { code, message }) => {
                assert_eq!(code, 40004);
                assert!(message.contains("authority"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auth_scope_resolves_names_best_effort() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/scopes"))
            .and(query_param("page_size", "100"))
            .respond_with(ok(serde_json::json!({
                "department_ids": ["D1"],
                "user_ids": ["u-1"],
                "group_ids": ["g-1"],
                "has_more": false
            })))
            .mount(&server)
            .await;
        mount_department(&server, "D1", "0", "Root").await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/users/u-1"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 41050,
                "msg": "no user authority error"
            })))
            .mount(&server)
            .await;

        let scope = client(&server)
            .auth_scope(IdSelectors::default())
            .await
            .unwrap();

        assert_eq!(scope.departments[0].name, "Root");
        assert_eq!(scope.users[0].id, "u-1");
        assert_eq!(scope.users[0].name, "");
        assert_eq!(scope.groups[0].id, "g-1");
    }

    async fn mount_user(server: &MockServer, id: &str, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/contact/v3/users/{}", id)))
            .respond_with(ok(serde_json::json!({"user": {"user_id": id, "name": name}})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_department_with_names_is_best_effort() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/departments/D2"))
            .respond_with(ok(serde_json::json!({
                "department": {
                    "department_id": "D2",
                    "name": "Eng",
                    "parent_department_id": "D1",
                    "leader_user_id": "ou_lead",
                    "leaders": [
                        {"leaderType": 1, "leaderID": "ou_lead"},
                        {"leaderType": 2, "leaderID": "ou_gone"}
                    ]
                }
            })))
            .mount(&server)
            .await;
        mount_department(&server, "D1", "0", "Root").await;
        mount_user(&server, "ou_lead", "Han Meimei").await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/users/ou_gone"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 41050,
                "msg": "no user authority error"
            })))
            .mount(&server)
            .await;

        let detail = client(&server)
            .department_with_names(&Identifier::stable("D2"), IdKind::Scoped)
            .await
            .unwrap();

        assert_eq!(detail.department.name, "Eng");
        assert_eq!(detail.parent_name, "Root");
        assert_eq!(detail.leader_name, "Han Meimei");
        assert_eq!(detail.leader_names.len(), 2);
        assert_eq!(detail.leader_names[0].name, "Han Meimei");
        assert_eq!(detail.leader_names[1].id, "ou_gone");
        assert_eq!(detail.leader_names[1].name, "");
    }

    #[tokio::test]
    async fn test_root_department_skips_parent_lookup() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        mount_department(&server, "D1", "0", "Root").await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/departments/0"))
            .respond_with(ok(serde_json::json!({"department": dept_json("0", "", "")})))
            .expect(0)
            .mount(&server)
            .await;

        let detail = client(&server)
            .department_with_names(&Identifier::stable("D1"), IdKind::Stable)
            .await
            .unwrap();
        assert_eq!(detail.parent_name, "");
        assert_eq!(detail.leader_name, "");
        assert!(detail.leader_names.is_empty());
    }

    #[tokio::test]
    async fn test_user_with_departments_is_best_effort() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/users/u-1"))
            .and(query_param("department_id_type", "department_id"))
            .respond_with(ok(serde_json::json!({
                "user": {"user_id": "u-1", "name": "Li Lei", "department_ids": ["D2", "D9"]}
            })))
            .mount(&server)
            .await;
        mount_department(&server, "D2", "D1", "Eng").await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/departments/D9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 40014,
                "msg": "no dept authority error"
            })))
            .mount(&server)
            .await;

        let detail = client(&server)
            .user_with_departments(&Identifier::stable("u-1"), IdKind::Stable)
            .await
            .unwrap();

        assert_eq!(detail.user.name, "Li Lei");
        assert_eq!(detail.departments.len(), 2);
        assert_eq!(detail.departments[0].name, "Eng");
        assert_eq!(detail.departments[1].id, "D9");
        assert_eq!(detail.departments[1].name, "");
    }

    #[tokio::test]
    async fn test_recursive_listing_under_open_ids_builds_tree() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/contact/v3/departments/od-1/children"))
            .and(query_param("department_id_type", "open_department_id"))
            .and(query_param("fetch_child", "true"))
            .respond_with(ok(serde_json::json!({
                "has_more": false,
                "items": [
                    dept_json("D2", "od-1", "Eng"),
                    dept_json("D3", "od-D2", "Infra"),
                    dept_json("D4", "od-1", "Sales")
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let departments = client(&server)
            .child_departments(&Identifier::scoped("od-1"), IdKind::Stable, true)
            .await
            .unwrap();
        let forest = department_tree(departments, IdKind::Scoped);

        let roots: Vec<&str> = forest.iter().map(|n| n.department.name.as_str()).collect();
        assert_eq!(roots, vec!["Eng", "Sales"]);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].department.name, "Infra");
    }

    #[tokio::test]
    async fn test_reset_email_password() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/admin/v1/password/reset"))
            .and(query_param("user_id_type", "open_id"))
            .and(body_json(serde_json::json!({
                "password": {"ent_email_password": "N3w-passw0rd"},
                "user_id": "ou_1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "msg": "success",
                "data": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .reset_email_password(&Identifier::scoped("ou_1"), "N3w-passw0rd")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_email_password_requires_password() {
        let server = MockServer::start().await;
        let result = client(&server)
            .reset_email_password(&Identifier::stable("u-1"), "")
            .await;
        assert!(matches!(result, Err(OrgError::Validation(_))));
    }

    #[tokio::test]
    async fn test_walk_over_http_attaches_shared_user_twice() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        mount_department(&server, "D1", "0", "Root").await;
        mount_department(&server, "D2", "D1", "Eng").await;
        mount_department(&server, "D3", "D1", "Sales").await;
        mount_children(
            &server,
            "D1",
            vec![dept_json("D2", "D1", "Eng"), dept_json("D3", "D1", "Sales")],
        )
        .await;
        mount_children(&server, "D2", vec![]).await;
        mount_children(&server, "D3", vec![]).await;
        let alice = serde_json::json!({
            "user_id": "u-alice",
            "name": "Alice",
            "department_ids": ["D2", "D3"]
        });
        mount_users(&server, "D1", vec![]).await;
        mount_users(&server, "D2", vec![alice.clone()]).await;
        mount_users(&server, "D3", vec![alice]).await;

        let c = client(&server);
        let options = WalkOptions {
            retry: RetryPolicy::new(3, Duration::from_millis(1)),
            interval: Duration::ZERO,
            abort_on_subtree_failure: true,
        };
        let walker = Walker::new(&c, IdSelectors::default(), options);
        let outcome = walker.walk(&[Identifier::stable("D1")]).await;

        assert!(!outcome.is_partial());
        let root = &outcome.forest[0];
        assert_eq!(root.department.name, "Root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].users[0].name, "Alice");
        assert_eq!(root.children[1].users[0].name, "Alice");
        assert_eq!(count_users(&outcome.forest), 2);
    }
}
