//! WeChat Work directory data models

use serde::{Deserialize, Serialize};

use crate::directory::transport::ApiStatus;
use crate::directory::tree::TreeRecord;

/// `{errcode, errmsg}` next to a reply's payload fields
#[derive(Deserialize, Debug)]
pub struct Reply<T> {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(flatten)]
    pub body: T,
}

impl<T> ApiStatus for Reply<T> {
    fn code(&self) -> i64 {
        self.errcode
    }

    fn message(&self) -> &str {
        &self.errmsg
    }
}

/// `gettoken` payload
#[derive(Deserialize, Debug, Default)]
pub struct TokenBody {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

/// `department/get` payload
#[derive(Deserialize, Debug, Default)]
pub struct DepartmentBody {
    #[serde(default)]
    pub department: Department,
}

/// `department/list` payload
#[derive(Deserialize, Debug, Default)]
pub struct DepartmentListBody {
    #[serde(default)]
    pub department: Vec<Department>,
}

/// `department/simplelist` payload
#[derive(Deserialize, Debug, Default)]
pub struct DepartmentIdListBody {
    #[serde(default)]
    pub department_id: Vec<SimpleDepartment>,
}

/// `user/list` payload
#[derive(Deserialize, Debug, Default)]
pub struct UserListBody {
    #[serde(default)]
    pub userlist: Vec<User>,
}

/// Department id with its position in the tree
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleDepartment {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub parentid: u64,
    #[serde(default)]
    pub order: u64,
}

impl TreeRecord for SimpleDepartment {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }

    fn parent_key(&self) -> u64 {
        self.parentid
    }
}

/// Department record from `department/get` and `department/list`
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Department {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub parentid: u64,
    #[serde(default)]
    pub order: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name_en: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub department_leader: Vec<String>,
}

impl Department {
    /// Leader user ids joined for display
    pub fn leaders(&self) -> String {
        self.department_leader.join(",")
    }
}

impl TreeRecord for Department {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }

    fn parent_key(&self) -> u64 {
        self.parentid
    }
}

/// Member record from `user/get` and `user/list`
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    #[serde(default)]
    pub userid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub open_userid: String,
    #[serde(default)]
    pub department: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub position: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mobile: String,
    /// "0" unknown, "1" male, "2" female
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gender: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub biz_mail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is_leader_in_dept: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub direct_leader: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub telephone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    /// 1 active, 2 disabled, 4 not activated, 5 left
    #[serde(default)]
    pub status: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub english_name: String,
    #[serde(default)]
    pub main_department: u64,
}

impl User {
    pub fn gender_label(&self) -> &'static str {
        match self.gender.as_str() {
            "1" => "male",
            "2" => "female",
            _ => "unknown",
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self.status {
            1 => "active",
            2 => "disabled",
            4 => "inactive",
            5 => "left",
            _ => "unknown",
        }
    }

    pub fn departments(&self) -> String {
        self.department
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Department id with its name, empty when the lookup failed
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DepartmentName {
    pub id: u64,
    pub name: String,
}

/// Member with the names of the departments it belongs to
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserWithDepartments {
    #[serde(flatten)]
    pub user: User,
    pub departments: Vec<DepartmentName>,
}

impl UserWithDepartments {
    /// `name (id)` per department, joined for display
    pub fn department_names(&self) -> String {
        self.departments
            .iter()
            .map(|d| {
                if d.name.is_empty() {
                    d.id.to_string()
                } else {
                    format!("{} ({})", d.name, d.id)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
