//! WeChat Work directory API operations

use log::debug;

use crate::config::wechat;
use crate::error::{OrgError, Result};

use super::client::WechatClient;
use super::models::{
    Department, DepartmentBody, DepartmentIdListBody, DepartmentListBody, DepartmentName,
    SimpleDepartment, User, UserListBody, UserWithDepartments,
};

fn require<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrgError::Validation(format!("{} must not be empty", what)));
    }
    Ok(trimmed)
}

impl WechatClient {
    /// Get a department by id
    pub async fn department(&self, id: &str) -> Result<Department> {
        let id = require(id, "department id")?;
        let body: DepartmentBody = self
            .get(
                wechat::DEPARTMENT_GET,
                &[("id", id)],
                &format!("department '{}'", id),
            )
            .await?;
        Ok(body.department)
    }

    /// Every department under `id` (the whole visible tree when `None`), flat
    pub async fn departments(&self, id: Option<&str>) -> Result<Vec<Department>> {
        let params = scope_params(id)?;
        let body: DepartmentListBody = self
            .get(wechat::DEPARTMENT_LIST, &params, "department list")
            .await?;
        Ok(body.department)
    }

    /// Department ids with their parents, flat
    pub async fn department_ids(&self, id: Option<&str>) -> Result<Vec<SimpleDepartment>> {
        let params = scope_params(id)?;
        let body: DepartmentIdListBody = self
            .get(wechat::DEPARTMENT_SIMPLE_LIST, &params, "department id list")
            .await?;
        Ok(body.department_id)
    }

    /// Get a member by userid
    pub async fn user(&self, userid: &str) -> Result<User> {
        let userid = require(userid, "user id")?;
        self.get(wechat::USER_GET, &[("userid", userid)], &format!("user '{}'", userid))
            .await
    }

    /// Get a member and resolve its department names.
    ///
    /// A department that cannot be read keeps an empty name.
    pub async fn user_with_departments(&self, userid: &str) -> Result<UserWithDepartments> {
        let user = self.user(userid).await?;
        let mut departments = Vec::with_capacity(user.department.len());
        for &id in &user.department {
            let name = match self.department(&id.to_string()).await {
                Ok(d) => d.name,
                Err(e) => {
                    debug!("Could not resolve department {}: {}", id, e);
                    String::new()
                }
            };
            departments.push(DepartmentName { id, name });
        }
        Ok(UserWithDepartments { user, departments })
    }

    /// Members of a department; with `recursive` also members of every sub-department
    pub async fn users(&self, department: &str, recursive: bool) -> Result<Vec<User>> {
        let department = require(department, "department id")?;
        let mut params = vec![("department_id", department)];
        if recursive {
            params.push(("fetch_child", "1"));
        }
        let body: UserListBody = self
            .get(
                wechat::USER_LIST,
                &params,
                &format!("users of department '{}'", department),
            )
            .await?;
        Ok(body.userlist)
    }
}

/// Optional `id` parameter; an explicitly given id must not be blank
fn scope_params(id: Option<&str>) -> Result<Vec<(&'static str, &str)>> {
    match id {
        Some(id) => Ok(vec![("id", require(id, "department id")?)]),
        None => Ok(Vec::new()),
    }
}
