//! Console rendering of department forests

use crate::directory::tree::DepartmentNode;

/// One-line description of a department or user in a tree
pub trait TreeLabel {
    fn tree_label(&self) -> String;
}

/// Render `forest` with box-drawing branches.
///
/// Users are listed under their department before its sub-departments
/// when `with_users` is set.
pub fn render_tree<D, U>(forest: &[DepartmentNode<D, U>], with_users: bool) -> String
where
    D: TreeLabel,
    U: TreeLabel,
{
    let mut out = String::new();
    for root in forest {
        out.push_str(&node_label(root));
        out.push('\n');
        render_children(root, "", with_users, &mut out);
    }
    out
}

fn node_label<D: TreeLabel, U>(node: &DepartmentNode<D, U>) -> String {
    if node.leader_name.is_empty() {
        node.department.tree_label()
    } else {
        format!(
            "{} [leader: {}]",
            node.department.tree_label(),
            node.leader_name
        )
    }
}

fn render_children<D, U>(
    node: &DepartmentNode<D, U>,
    prefix: &str,
    with_users: bool,
    out: &mut String,
) where
    D: TreeLabel,
    U: TreeLabel,
{
    let users: &[U] = if with_users { &node.users } else { &[] };
    let total = users.len() + node.children.len();
    let mut index = 0;

    for user in users {
        index += 1;
        let branch = if index == total { "└── " } else { "├── " };
        out.push_str(&format!("{}{}👤 {}\n", prefix, branch, user.tree_label()));
    }

    for child in &node.children {
        index += 1;
        let last = index == total;
        let branch = if last { "└── " } else { "├── " };
        out.push_str(&format!("{}{}{}\n", prefix, branch, node_label(child)));
        let next_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        render_children(child, &next_prefix, with_users, out);
    }
}

pub fn print_tree<D, U>(forest: &[DepartmentNode<D, U>], with_users: bool)
where
    D: TreeLabel,
    U: TreeLabel,
{
    if forest.is_empty() {
        println!("No departments found.");
        return;
    }
    print!("{}", render_tree(forest, with_users));
}
