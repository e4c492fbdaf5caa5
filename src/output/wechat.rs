//! WeChat Work department and member output

use comfy_table::{presets::NOTHING, Table};

use super::common::{print_csv, print_json, print_yaml, CsvRecord};
use super::tree::TreeLabel;
use crate::cli::OutputFormat;
use crate::directory::wechat::{Department, SimpleDepartment, User, UserWithDepartments};

impl TreeLabel for Department {
    fn tree_label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

impl TreeLabel for SimpleDepartment {
    fn tree_label(&self) -> String {
        self.id.to_string()
    }
}

impl TreeLabel for User {
    fn tree_label(&self) -> String {
        format!("{} ({})", self.name, self.userid)
    }
}

impl CsvRecord for Department {
    fn csv_header() -> &'static [&'static str] {
        &["ID", "NAME", "EN NAME", "PARENT", "ORDER", "LEADERS"]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.name_en.clone(),
            self.parentid.to_string(),
            self.order.to_string(),
            self.leaders(),
        ]
    }
}

impl CsvRecord for User {
    fn csv_header() -> &'static [&'static str] {
        &[
            "USERID",
            "NAME",
            "DEPARTMENTS",
            "POSITION",
            "MOBILE",
            "EMAIL",
            "BIZ MAIL",
            "GENDER",
            "STATUS",
        ]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.userid.clone(),
            self.name.clone(),
            self.departments(),
            self.position.clone(),
            self.mobile.clone(),
            self.email.clone(),
            self.biz_mail.clone(),
            self.gender_label().to_string(),
            self.status_label().to_string(),
        ]
    }
}

impl CsvRecord for UserWithDepartments {
    fn csv_header() -> &'static [&'static str] {
        User::csv_header()
    }

    fn csv_fields(&self) -> Vec<String> {
        let mut fields = self.user.csv_fields();
        fields[2] = self.department_names();
        fields
    }
}

pub fn output_wechat_departments(departments: &[Department], format: OutputFormat, no_header: bool) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec!["ID", "NAME", "PARENT", "ORDER", "LEADERS"]);
            }
            for d in departments {
                table.add_row(vec![
                    d.id.to_string(),
                    d.name.clone(),
                    d.parentid.to_string(),
                    d.order.to_string(),
                    d.leaders(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Csv => print_csv(departments, no_header),
        OutputFormat::Json => print_json(departments),
        OutputFormat::Yaml => print_yaml(departments),
    }
}

pub fn output_wechat_users(users: &[User], format: OutputFormat, no_header: bool) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec![
                    "USERID",
                    "NAME",
                    "DEPARTMENTS",
                    "POSITION",
                    "MOBILE",
                    "EMAIL",
                    "STATUS",
                ]);
            }
            for u in users {
                table.add_row(vec![
                    u.userid.clone(),
                    u.name.clone(),
                    u.departments(),
                    u.position.clone(),
                    u.mobile.clone(),
                    u.email.clone(),
                    u.status_label().to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Csv => print_csv(users, no_header),
        OutputFormat::Json => print_json(users),
        OutputFormat::Yaml => print_yaml(users),
    }
}

/// A single member with department names
pub fn output_wechat_user_detail(detail: &UserWithDepartments, format: OutputFormat, no_header: bool) {
    match format {
        OutputFormat::Table => {
            let u = &detail.user;
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec![
                    "USERID",
                    "NAME",
                    "DEPARTMENTS",
                    "POSITION",
                    "MOBILE",
                    "EMAIL",
                    "STATUS",
                ]);
            }
            table.add_row(vec![
                u.userid.clone(),
                u.name.clone(),
                detail.department_names(),
                u.position.clone(),
                u.mobile.clone(),
                u.email.clone(),
                u.status_label().to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Csv => print_csv(std::slice::from_ref(detail), no_header),
        OutputFormat::Json => print_json(detail),
        OutputFormat::Yaml => print_yaml(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_csv_fields() {
        let user = User {
            userid: "zhangsan".to_string(),
            name: "Zhang San".to_string(),
            department: vec![1, 2],
            gender: "1".to_string(),
            status: 1,
            ..Default::default()
        };
        let fields = user.csv_fields();
        assert_eq!(fields.len(), User::csv_header().len());
        assert_eq!(fields[2], "1,2");
        assert_eq!(fields[7], "male");
        assert_eq!(fields[8], "active");
    }

    #[test]
    fn test_labels() {
        let dept = Department {
            id: 2,
            parentid: 1,
            name: "R&D".to_string(),
            ..Default::default()
        };
        assert_eq!(dept.tree_label(), "R&D (2)");
        assert_eq!(dept.csv_fields()[3], "1");

        let simple = SimpleDepartment {
            id: 7,
            parentid: 2,
            order: 0,
        };
        assert_eq!(simple.tree_label(), "7");
    }

    #[test]
    fn test_user_detail_csv_names_departments() {
        let detail = UserWithDepartments {
            user: User {
                userid: "lisi".to_string(),
                department: vec![2, 7],
                ..Default::default()
            },
            departments: vec![
                crate::directory::wechat::DepartmentName {
                    id: 2,
                    name: "R&D".to_string(),
                },
                crate::directory::wechat::DepartmentName {
                    id: 7,
                    name: String::new(),
                },
            ],
        };
        let fields = detail.csv_fields();
        assert_eq!(fields.len(), UserWithDepartments::csv_header().len());
        assert_eq!(fields[2], "R&D (2), 7");
    }
}
