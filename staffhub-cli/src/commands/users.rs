use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Subcommand};
use rpassword::prompt_password;
use shared::{
    config::ClientConfig,
    format::{format_date, format_relative, initials, is_valid_email, truncate},
    models::{ContractType, CreateUserRequest, UpdateUserRequest, User, UserFilters, UserRole},
};

use super::{Output, confirm, signed_in};

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List collaborators
    List(ListArgs),
    /// Show one collaborator
    Get {
        /// Collaborator identifier
        id: String,
    },
    /// Show the signed-in collaborator
    Me,
    /// Create a collaborator (managers only)
    Create(CreateArgs),
    /// Update a collaborator
    Update(UpdateArgs),
    /// Delete a collaborator (managers only)
    Delete {
        /// Collaborator identifier
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// One-based page number
    #[arg(long)]
    pub page: Option<u32>,
    /// Page size
    #[arg(long)]
    pub limit: Option<u32>,
    /// Filter by name substring
    #[arg(long)]
    pub name: Option<String>,
    /// Filter by e-mail substring
    #[arg(long)]
    pub email: Option<String>,
    /// Filter by role (normal or manager)
    #[arg(long)]
    pub role: Option<UserRole>,
    /// Filter by area identifier
    #[arg(long)]
    pub area: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Full name
    #[arg(long)]
    pub name: String,
    /// Login e-mail
    #[arg(long)]
    pub email: String,
    /// Age in years
    #[arg(long)]
    pub age: u32,
    /// Contract type (clt, pj or freelancer)
    #[arg(long)]
    pub contract: ContractType,
    /// Role (normal or manager)
    #[arg(long)]
    pub role: Option<UserRole>,
    /// Area identifier; repeat for several areas
    #[arg(long = "area")]
    pub areas: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Collaborator identifier
    pub id: String,
    /// New full name
    #[arg(long)]
    pub name: Option<String>,
    /// New login e-mail
    #[arg(long)]
    pub email: Option<String>,
    /// New age
    #[arg(long)]
    pub age: Option<u32>,
    /// New contract type
    #[arg(long)]
    pub contract: Option<ContractType>,
    /// New role (managers only)
    #[arg(long)]
    pub role: Option<UserRole>,
    /// Replacement area identifier; repeat for several areas
    #[arg(long = "area")]
    pub areas: Option<Vec<String>>,
}

pub async fn run(command: UsersCommand, config: &ClientConfig, output: Output) -> Result<()> {
    let store = signed_in(config).await?;
    let api = store.api();
    let permissions = store.permissions();

    match command {
        UsersCommand::List(args) => {
            let filters = UserFilters {
                page: args.page,
                limit: args.limit,
                name: args.name,
                email: args.email,
                role: args.role,
                area_id: args.area,
            };
            let page = api
                .list_users(&filters)
                .await
                .context("failed to list collaborators")?;
            output.emit(&page.items, |users| {
                print_table(users);
                if let Some(pagination) = page.pagination {
                    println!(
                        "page {}/{} ({} collaborators)",
                        pagination.page, pagination.total_pages, pagination.total
                    );
                }
            })
        }
        UsersCommand::Get { id } => {
            let user = api
                .get_user(&id)
                .await
                .with_context(|| format!("failed to fetch collaborator {id}"))?;
            output.emit(&user, print_details)
        }
        UsersCommand::Me => {
            let user = api.current_user().await.context("failed to fetch profile")?;
            output.emit(&user, print_details)
        }
        UsersCommand::Create(args) => {
            if !permissions.create_user {
                bail!("only managers can create collaborators");
            }
            if !is_valid_email(&args.email) {
                bail!("'{}' is not a valid e-mail address", args.email);
            }
            let password = prompt_password("Initial password: ")?;
            if password.len() < 6 {
                bail!("password must have at least 6 characters");
            }
            let request = CreateUserRequest {
                name: args.name,
                email: args.email,
                password,
                age: args.age,
                contract_type: args.contract,
                role: args.role,
                area_ids: args.areas,
            };
            let user = api
                .create_user(&request)
                .await
                .context("failed to create collaborator")?;
            output.emit(&user, |user| println!("Created {} ({})", user.name, user.id))
        }
        UsersCommand::Update(args) => {
            if !permissions.update_user(store.user().as_ref(), &args.id) {
                bail!("you can only update your own profile");
            }
            if args.role.is_some() && !permissions.is_manager() {
                bail!("only managers can change roles");
            }
            let request = UpdateUserRequest {
                name: args.name,
                email: args.email,
                age: args.age,
                contract_type: args.contract,
                role: args.role,
                area_ids: args.areas,
            };
            if request.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            let user = api
                .update_user(&args.id, &request)
                .await
                .with_context(|| format!("failed to update collaborator {}", args.id))?;
            output.emit(&user, print_details)
        }
        UsersCommand::Delete { id, yes } => {
            if !permissions.delete_user {
                bail!("only managers can delete collaborators");
            }
            if !confirm(&format!("Delete collaborator {id}?"), yes)? {
                println!("Aborted.");
                return Ok(());
            }
            api.delete_user(&id)
                .await
                .with_context(|| format!("failed to delete collaborator {id}"))?;
            println!("Deleted collaborator {id}.");
            Ok(())
        }
    }
}

fn print_table(users: &[User]) {
    if users.is_empty() {
        println!("No collaborators found.");
        return;
    }
    println!(
        "{:<4} {:<24} {:<28} {:<12} {}",
        "", "NAME", "E-MAIL", "ROLE", "AREAS"
    );
    for user in users {
        let areas = user
            .areas
            .iter()
            .map(|area| area.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<4} {:<24} {:<28} {:<12} {}",
            initials(&user.name),
            truncate(&user.name, 24),
            truncate(&user.email, 28),
            user.role.label(),
            areas
        );
    }
}

fn print_details(user: &User) {
    println!("{} ({})", user.name, user.id);
    println!("e-mail: {}", user.email);
    println!("role: {}", user.role.label());
    if user.age > 0 {
        println!("age: {}", user.age);
    }
    if let Some(contract) = user.contract_type {
        println!("contract: {}", contract.label());
    }
    for area in &user.areas {
        println!("area: {}", area.name);
    }
    if let Some(projects) = &user.projects {
        for project in projects {
            println!("project: {}", project.name);
        }
    }
    println!(
        "member since {} (updated {})",
        format_date(&user.created_at.0),
        format_relative(&user.updated_at.0, &Utc::now())
    );
}
