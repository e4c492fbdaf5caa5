//! WeChat Work command handlers

use std::collections::HashSet;

use log::{debug, info};

use crate::cli::{WechatCommand, WechatDpCommand, WechatDumpArgs, WechatUserCommand};
use crate::config::reports;
use crate::directory::retry::retry;
use crate::directory::tree::{attach_user, build_tree, count_departments, DepartmentNode};
use crate::output::{
    output_wechat_departments, output_wechat_user_detail, output_wechat_users, print_tree,
    report,
};
use crate::session::Session;
use crate::ui::{create_spinner, finish_spinner, set_spinner_message};

use super::client::WechatClient;
use super::models::{Department, SimpleDepartment, User};

type CommandResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Run a `wechat` subcommand
pub async fn run_wechat_command(session: &Session, command: &WechatCommand) -> CommandResult {
    let client = session.wechat_client()?;

    match command {
        WechatCommand::Token => {
            let token = client.access_token().await?;
            println!("access_token: {}", token);
        }
        WechatCommand::Dp { command } => run_dp_command(session, &client, command).await?,
        WechatCommand::User { command } => run_user_command(session, &client, command).await?,
        WechatCommand::Dump(args) => run_dump_command(session, &client, args).await?,
    }
    Ok(())
}

async fn run_dp_command(
    session: &Session,
    client: &WechatClient,
    command: &WechatDpCommand,
) -> CommandResult {
    let settings = session.settings();
    match command {
        WechatDpCommand::Get(args) => {
            let spinner =
                create_spinner(&format!("Fetching department {}...", args.id), settings.batch);
            let department = client.department(&args.id).await?;
            finish_spinner(spinner, "Done");
            output_wechat_departments(&[department], args.output, settings.no_header);
        }
        WechatDpCommand::Ls(args) => {
            let spinner = create_spinner("Fetching department ids...", settings.batch);
            let ids = client.department_ids(args.id.as_deref()).await?;
            finish_spinner(spinner, &format!("Found {} departments", ids.len()));

            let forest = build_tree::<SimpleDepartment, User>(ids);
            print_tree(&forest, false);
            if !forest.is_empty() {
                let path = report::write_html_report(
                    &args.out_dir,
                    reports::WECHAT_DEPARTMENT_IDS,
                    "WeChat Work department ids",
                    &forest,
                )?;
                println!("\nReport written: {}", path.display());
            }
        }
        WechatDpCommand::Tree(args) => {
            let spinner = create_spinner("Fetching departments...", settings.batch);
            let departments = client.departments(args.id.as_deref()).await?;
            finish_spinner(spinner, &format!("Found {} departments", departments.len()));

            let mut forest = build_tree::<Department, User>(departments);
            fill_parent_names(&mut forest, "");
            print_tree(&forest, false);
            if !forest.is_empty() {
                let path = report::write_html_report(
                    &args.out_dir,
                    reports::WECHAT_DEPARTMENTS,
                    "WeChat Work departments",
                    &forest,
                )?;
                println!("\nReport written: {}", path.display());
            }
        }
    }
    Ok(())
}

async fn run_user_command(
    session: &Session,
    client: &WechatClient,
    command: &WechatUserCommand,
) -> CommandResult {
    let settings = session.settings();
    match command {
        WechatUserCommand::Get(args) => {
            let spinner =
                create_spinner(&format!("Fetching user '{}'...", args.userid), settings.batch);
            let detail = client.user_with_departments(&args.userid).await?;
            finish_spinner(spinner, "Done");
            output_wechat_user_detail(&detail, args.output, settings.no_header);
        }
        WechatUserCommand::Ls(args) => {
            let spinner = create_spinner(
                &format!("Fetching users of department {}...", args.department_id),
                settings.batch,
            );
            let users = client.users(&args.department_id, args.recursive).await?;
            finish_spinner(spinner, &format!("Found {} users", users.len()));

            if users.is_empty() {
                eprintln!("No users found in department {}", args.department_id);
                return Ok(());
            }
            output_wechat_users(&users, args.output, settings.no_header);
            let path = report::write_csv(&args.out_dir, reports::WECHAT_USERS, &users)?;
            eprintln!("Report written: {}", path.display());
        }
    }
    Ok(())
}

/// Whole-corp (or one subtree) dump: one department list, one recursive user list per root
async fn run_dump_command(
    session: &Session,
    client: &WechatClient,
    args: &WechatDumpArgs,
) -> CommandResult {
    let settings = session.settings();
    let policy = settings.retry;

    let spinner = create_spinner("Fetching departments...", settings.batch);
    let departments = retry(policy, "department list", || {
        client.departments(args.id.as_deref())
    })
    .await?;

    let mut forest = build_tree::<Department, User>(departments);
    fill_parent_names(&mut forest, "");

    if forest.is_empty() {
        finish_spinner(spinner, "No departments found");
        return Ok(());
    }

    // Departments whose parent is not listed are roots too
    let roots: Vec<String> = forest
        .iter()
        .map(|root| root.department.id.to_string())
        .collect();
    let mut users = Vec::new();
    for root in &roots {
        set_spinner_message(&spinner, format!("Fetching users under department {}...", root));
        let batch = retry(policy, "user list", || client.users(root, true)).await?;
        debug!("Fetched {} users under department {}", batch.len(), root);
        users.extend(batch);
    }

    let attached = attach_members(&mut forest, unique_members(users));
    finish_spinner(
        spinner,
        &format!(
            "Fetched {} departments, {} user entries",
            count_departments(&forest),
            attached
        ),
    );
    info!("Attached {} user entries", attached);

    print_tree(&forest, true);

    let html = report::write_html_report(
        &args.out_dir,
        reports::WECHAT_DUMP,
        "WeChat Work organization",
        &forest,
    )?;
    let csv = report::write_dump_csv(&args.out_dir, reports::WECHAT_DUMP, &forest)?;
    println!("\nReports written: {}, {}", html.display(), csv.display());
    Ok(())
}

/// Drop repeated members, keeping the first record per userid
fn unique_members(users: Vec<User>) -> Vec<User> {
    let mut seen = HashSet::new();
    users
        .into_iter()
        .filter(|u| seen.insert(u.userid.clone()))
        .collect()
}

/// Attach each member to every listed department found in the forest
fn attach_members(forest: &mut [DepartmentNode<Department, User>], users: Vec<User>) -> usize {
    let mut attached = 0;
    for user in users {
        for department in &user.department {
            if attach_user(forest, department, user.clone()) {
                attached += 1;
            }
        }
    }
    attached
}

fn fill_parent_names(nodes: &mut [DepartmentNode<Department, User>], parent: &str) {
    for node in nodes {
        node.parent_name = parent.to_string();
        let name = node.department.name.clone();
        fill_parent_names(&mut node.children, &name);
    }
}
