//! Feishu department, user and scope output

use comfy_table::{presets::NOTHING, Table};
use serde::Serialize;

use super::common::{print_csv, print_json, print_yaml, CsvRecord};
use super::tree::TreeLabel;
use crate::cli::OutputFormat;
use crate::directory::feishu::models::named;
use crate::directory::feishu::{
    AuthScope, Department, DepartmentWithNames, ScopeItem, User, UserWithDepartments,
};

impl TreeLabel for Department {
    fn tree_label(&self) -> String {
        if self.department_id.is_empty() {
            format!("{} ({})", self.name, self.open_department_id)
        } else {
            format!("{} ({})", self.name, self.department_id)
        }
    }
}

impl TreeLabel for User {
    fn tree_label(&self) -> String {
        if self.user_id.is_empty() {
            format!("{} ({})", self.name, self.open_id)
        } else {
            format!("{} ({})", self.name, self.user_id)
        }
    }
}

impl CsvRecord for Department {
    fn csv_header() -> &'static [&'static str] {
        &[
            "ID", "OPEN ID", "NAME", "EN NAME", "PARENT", "LEADER", "MEMBERS", "DELETED",
        ]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.department_id.clone(),
            self.open_department_id.clone(),
            self.name.clone(),
            self.en_name().to_string(),
            self.parent_department_id.clone(),
            self.leader().to_string(),
            self.member_count().to_string(),
            self.is_deleted().to_string(),
        ]
    }
}

impl CsvRecord for User {
    fn csv_header() -> &'static [&'static str] {
        &[
            "USER ID",
            "OPEN ID",
            "NAME",
            "MOBILE",
            "EMAIL",
            "ENTERPRISE EMAIL",
            "GENDER",
            "JOB TITLE",
            "STATUS",
            "DEPARTMENTS",
            "TENANT MANAGER",
        ]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.open_id.clone(),
            self.name.clone(),
            self.mobile().to_string(),
            self.email().to_string(),
            self.enterprise_email().to_string(),
            self.gender_label().to_string(),
            self.job_title().to_string(),
            self.status_label(),
            self.department_ids.join(","),
            self.is_tenant_manager().to_string(),
        ]
    }
}

/// Departments in the specified format
pub fn output_feishu_departments(departments: &[Department], format: OutputFormat, no_header: bool) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec!["ID", "OPEN ID", "NAME", "PARENT", "LEADER", "MEMBERS"]);
            }
            for d in departments {
                table.add_row(vec![
                    d.department_id.as_str(),
                    d.open_department_id.as_str(),
                    d.name.as_str(),
                    d.parent_department_id.as_str(),
                    d.leader(),
                    &d.member_count().to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Csv => print_csv(departments, no_header),
        OutputFormat::Json => print_json(departments),
        OutputFormat::Yaml => print_yaml(departments),
    }
}

/// Users in the specified format
pub fn output_feishu_users(users: &[User], format: OutputFormat, no_header: bool) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec![
                    "USER ID", "OPEN ID", "NAME", "MOBILE", "EMAIL", "GENDER", "STATUS",
                ]);
            }
            for u in users {
                table.add_row(vec![
                    u.user_id.clone(),
                    u.open_id.clone(),
                    u.name.clone(),
                    u.mobile().to_string(),
                    u.email().to_string(),
                    u.gender_label().to_string(),
                    u.status_label(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Csv => print_csv(users, no_header),
        OutputFormat::Json => print_json(users),
        OutputFormat::Yaml => print_yaml(users),
    }
}

fn joined_names(items: &[ScopeItem]) -> String {
    items
        .iter()
        .map(|i| named(&i.id, &i.name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CsvRecord for DepartmentWithNames {
    fn csv_header() -> &'static [&'static str] {
        &[
            "ID",
            "OPEN ID",
            "NAME",
            "EN NAME",
            "PARENT",
            "PARENT NAME",
            "LEADER",
            "LEADER NAME",
            "LEADERS",
            "MEMBERS",
            "DELETED",
        ]
    }

    fn csv_fields(&self) -> Vec<String> {
        let d = &self.department;
        vec![
            d.department_id.clone(),
            d.open_department_id.clone(),
            d.name.clone(),
            d.en_name().to_string(),
            d.parent_department_id.clone(),
            self.parent_name.clone(),
            d.leader().to_string(),
            self.leader_name.clone(),
            joined_names(&self.leader_names),
            d.member_count().to_string(),
            d.is_deleted().to_string(),
        ]
    }
}

impl CsvRecord for UserWithDepartments {
    fn csv_header() -> &'static [&'static str] {
        &[
            "USER ID",
            "OPEN ID",
            "NAME",
            "MOBILE",
            "EMAIL",
            "ENTERPRISE EMAIL",
            "GENDER",
            "JOB TITLE",
            "STATUS",
            "DEPARTMENTS",
            "TENANT MANAGER",
        ]
    }

    fn csv_fields(&self) -> Vec<String> {
        let mut fields = self.user.csv_fields();
        fields[9] = joined_names(&self.departments);
        fields
    }
}

/// A single department with its parent and leader names
pub fn output_feishu_department_detail(
    detail: &DepartmentWithNames,
    format: OutputFormat,
    no_header: bool,
) {
    match format {
        OutputFormat::Table => {
            let d = &detail.department;
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec!["ID", "OPEN ID", "NAME", "PARENT", "LEADER", "MEMBERS"]);
            }
            table.add_row(vec![
                d.department_id.clone(),
                d.open_department_id.clone(),
                d.name.clone(),
                named(&d.parent_department_id, &detail.parent_name),
                named(d.leader(), &detail.leader_name),
                d.member_count().to_string(),
            ]);
            println!("{table}");
            if !detail.leader_names.is_empty() {
                println!("\nLeaders: {}", joined_names(&detail.leader_names));
            }
        }
        OutputFormat::Csv => print_csv(std::slice::from_ref(detail), no_header),
        OutputFormat::Json => print_json(detail),
        OutputFormat::Yaml => print_yaml(detail),
    }
}

/// A single user with its department names
pub fn output_feishu_user_detail(
    detail: &UserWithDepartments,
    format: OutputFormat,
    no_header: bool,
) {
    match format {
        OutputFormat::Table => {
            output_feishu_users(std::slice::from_ref(&detail.user), format, no_header);
            if !detail.departments.is_empty() {
                println!("\nDepartments: {}", joined_names(&detail.departments));
            }
        }
        OutputFormat::Csv => print_csv(std::slice::from_ref(detail), no_header),
        OutputFormat::Json => print_json(detail),
        OutputFormat::Yaml => print_yaml(detail),
    }
}

/// Scope entry flattened for output
#[derive(Serialize)]
struct ScopeRow<'a> {
    kind: &'static str,
    id: &'a str,
    name: &'a str,
}

fn rows<'a>(kind: &'static str, items: &'a [ScopeItem]) -> Vec<ScopeRow<'a>> {
    items
        .iter()
        .map(|i| ScopeRow {
            kind,
            id: &i.id,
            name: &i.name,
        })
        .collect()
}

fn scope_rows(scope: &AuthScope) -> Vec<ScopeRow<'_>> {
    let mut all = rows("department", &scope.departments);
    all.extend(rows("user", &scope.users));
    all.extend(rows("group", &scope.groups));
    all
}

/// Tenant token plus the app's authorization scope
pub fn output_token_scope(token: &str, scope: &AuthScope, format: OutputFormat, no_header: bool) {
    match format {
        OutputFormat::Table => {
            println!("tenant_access_token: {}", token);
            if scope.is_empty() {
                println!("\nAuth scope is empty.");
                return;
            }
            println!();
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec!["KIND", "ID", "NAME"]);
            }
            for row in scope_rows(scope) {
                table.add_row(vec![row.kind, row.id, row.name]);
            }
            println!("{table}");
        }
        OutputFormat::Csv => {
            if !no_header {
                println!("KIND,ID,NAME");
            }
            for row in scope_rows(scope) {
                println!("{}", super::common::csv_line(&[row.kind, row.id, row.name]));
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            #[derive(Serialize)]
            struct TokenScope<'a> {
                tenant_access_token: &'a str,
                scope: &'a AuthScope,
            }
            let value = TokenScope {
                tenant_access_token: token,
                scope,
            };
            if format == OutputFormat::Json {
                print_json(&value);
            } else {
                print_yaml(&value);
            }
        }
    }
}
