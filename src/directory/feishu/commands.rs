//! Feishu command handlers

use log::{debug, info, warn};

use crate::cli::{
    EmailPasswordArgs, FeishuCommand, FeishuDpCommand, FeishuDumpArgs, FeishuUserCommand,
    OutputFormat,
};
use crate::config::reports;
use crate::directory::identifier::Identifier;
use crate::directory::tree::count_departments;
use crate::directory::walker::Walker;
use crate::output::{
    output_feishu_department_detail, output_feishu_departments, output_feishu_user_detail,
    output_feishu_users, output_token_scope, print_tree, report,
};
use crate::session::Session;
use crate::ui::{
    create_spinner, finish_spinner, finish_spinner_with_status, prompt_secret,
    set_spinner_message,
};

use super::client::FeishuClient;
use super::models::department_tree;

type CommandResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Run a `feishu` subcommand
pub async fn run_feishu_command(session: &Session, command: &FeishuCommand) -> CommandResult {
    let client = session.feishu_client()?;
    let settings = session.settings();

    match command {
        FeishuCommand::Token(args) => {
            let spinner = create_spinner("Issuing tenant token...", settings.batch);
            let token = client.tenant_access_token().await?;
            set_spinner_message(&spinner, "Fetching auth scope...".to_string());
            let scope = client.auth_scope(args.ids.selectors()).await?;
            finish_spinner(spinner, "Done");
            output_token_scope(&token, &scope, args.output, settings.no_header);
        }
        FeishuCommand::Dp { command } => run_dp_command(session, &client, command).await?,
        FeishuCommand::User { command } => run_user_command(session, &client, command).await?,
        FeishuCommand::EmailPassword(args) => {
            run_email_password_command(session, &client, args).await?
        }
        FeishuCommand::Dump(args) => run_dump_command(session, &client, args).await?,
    }
    Ok(())
}

async fn run_dp_command(
    session: &Session,
    client: &FeishuClient,
    command: &FeishuDpCommand,
) -> CommandResult {
    let settings = session.settings();
    match command {
        FeishuDpCommand::Get(args) => {
            let ids = args.ids.selectors();
            let id = Identifier::new(ids.department, args.id.as_str());
            let spinner = create_spinner(&format!("Fetching department '{}'...", id), settings.batch);
            let detail = client.department_with_names(&id, ids.user).await?;
            finish_spinner(spinner, "Done");
            output_feishu_department_detail(&detail, args.output, settings.no_header);
        }
        FeishuDpCommand::Ls(args) => {
            let ids = args.ids.selectors();
            let id = Identifier::new(ids.department, args.id.as_str());
            let spinner = create_spinner(
                &format!("Fetching sub-departments of '{}'...", id),
                settings.batch,
            );
            let departments = client
                .child_departments(&id, ids.user, args.recursive)
                .await?;
            finish_spinner(spinner, &format!("Found {} departments", departments.len()));

            if departments.is_empty() {
                eprintln!("No sub-departments found under '{}'", id);
                return Ok(());
            }
            if args.recursive && args.output == OutputFormat::Table {
                let forest = department_tree(departments, ids.department);
                print_tree(&forest, false);
            } else {
                output_feishu_departments(&departments, args.output, settings.no_header);
            }
        }
    }
    Ok(())
}

async fn run_user_command(
    session: &Session,
    client: &FeishuClient,
    command: &FeishuUserCommand,
) -> CommandResult {
    let settings = session.settings();
    match command {
        FeishuUserCommand::Get(args) => {
            let ids = args.ids.selectors();
            let id = Identifier::new(ids.user, args.id.as_str());
            let spinner = create_spinner(&format!("Fetching user '{}'...", id), settings.batch);
            let detail = client.user_with_departments(&id, ids.department).await?;
            finish_spinner(spinner, "Done");
            output_feishu_user_detail(&detail, args.output, settings.no_header);
        }
        FeishuUserCommand::Ls(args) => {
            let ids = args.ids.selectors();
            let department = Identifier::new(ids.department, args.department_id.as_str());
            let spinner = create_spinner(
                &format!("Fetching users of department '{}'...", department),
                settings.batch,
            );
            let users = client.users_by_department(&department, ids.user).await?;
            finish_spinner(spinner, &format!("Found {} users", users.len()));

            if users.is_empty() {
                eprintln!("No users found in department '{}'", department);
                return Ok(());
            }
            output_feishu_users(&users, args.output, settings.no_header);
        }
    }
    Ok(())
}

async fn run_email_password_command(
    session: &Session,
    client: &FeishuClient,
    args: &EmailPasswordArgs,
) -> CommandResult {
    let user = Identifier::new(args.ids.selectors().user, args.user_id.as_str());
    user.require("user id")?;

    let password = match &args.password {
        Some(password) => password.clone(),
        None if session.settings().batch => {
            return Err("--password is required in batch mode".into());
        }
        None => prompt_secret("New mailbox password")?,
    };

    client.reset_email_password(&user, &password).await?;
    println!("Mailbox password reset for user '{}'", user);
    Ok(())
}

async fn run_dump_command(
    session: &Session,
    client: &FeishuClient,
    args: &FeishuDumpArgs,
) -> CommandResult {
    let settings = session.settings();
    let ids = args.ids.selectors();

    let roots: Vec<Identifier> = match &args.id {
        Some(id) => vec![Identifier::new(ids.department, id.as_str())],
        None => {
            debug!("No department given, walking the auth scope");
            let scope = client.auth_scope(ids).await?;
            scope
                .departments
                .iter()
                .map(|d| Identifier::new(ids.department, d.id.as_str()))
                .collect()
        }
    };

    if roots.is_empty() {
        eprintln!("The app's auth scope contains no departments");
        return Ok(());
    }
    info!("Walking {} root department(s)", roots.len());

    let spinner = create_spinner("Walking departments...", settings.batch);
    let progress = |count: usize, name: &str| {
        set_spinner_message(&spinner, format!("Walking departments... {} ({})", count, name));
    };
    let outcome = Walker::new(client, ids, settings.walk_options())
        .with_progress(&progress)
        .walk(&roots)
        .await;

    let departments = count_departments(&outcome.forest);
    finish_spinner_with_status(spinner, departments, outcome.is_partial());

    print_tree(&outcome.forest, true);

    if outcome.is_partial() {
        warn!("Results are incomplete, writing what was fetched");
        for failure in &outcome.failures {
            eprintln!("Warning: {}", failure);
        }
    }

    if outcome.forest.is_empty() {
        return Err("No departments could be fetched".into());
    }

    let html = report::write_html_report(
        &args.out_dir,
        reports::FEISHU_DUMP,
        "Feishu organization",
        &outcome.forest,
    )?;
    let csv = report::write_dump_csv(&args.out_dir, reports::FEISHU_DUMP, &outcome.forest)?;
    println!("\nReports written: {}, {}", html.display(), csv.display());
    Ok(())
}
