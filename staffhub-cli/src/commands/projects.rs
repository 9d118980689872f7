use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Args, Subcommand};
use shared::{
    config::ClientConfig,
    format::{format_date, format_relative, truncate},
    models::{
        CreateProjectRequest, Project, ProjectFilters, ProjectStatus, Timestamp,
        UpdateProjectRequest,
    },
};

use super::{Output, confirm, signed_in};

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects
    List(ListArgs),
    /// Show one project
    Get {
        /// Project identifier
        id: String,
    },
    /// Create a project (managers only)
    Create(CreateArgs),
    /// Update a project (managers only)
    Update(UpdateArgs),
    /// Delete a project (managers only)
    Delete {
        /// Project identifier
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
    /// Filter by status (planning, development, completed or cancelled)
    #[arg(long)]
    pub status: Option<ProjectStatus>,
    /// Only projects this collaborator is assigned to
    #[arg(long)]
    pub collaborator: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,
    /// Deadline as YYYY-MM-DD
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
    /// Technology tag; repeat for several
    #[arg(long = "tech")]
    pub technologies: Vec<String>,
    /// Collaborator identifier to assign; repeat for several
    #[arg(long = "collaborator")]
    pub collaborators: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Project identifier
    pub id: String,
    /// New display name
    #[arg(long)]
    pub name: Option<String>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// New deadline as YYYY-MM-DD
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
    /// Replacement technology tag; repeat for several
    #[arg(long = "tech")]
    pub technologies: Option<Vec<String>>,
    /// New status
    #[arg(long)]
    pub status: Option<ProjectStatus>,
    /// Replacement collaborator identifier; repeat for several
    #[arg(long = "collaborator")]
    pub collaborators: Option<Vec<String>>,
}

pub async fn run(command: ProjectsCommand, config: &ClientConfig, output: Output) -> Result<()> {
    let store = signed_in(config).await?;
    let api = store.api();
    let permissions = store.permissions();

    match command {
        ProjectsCommand::List(args) => {
            let filters = ProjectFilters {
                page: args.page,
                limit: args.limit,
                name: args.name,
                status: args.status,
                collaborator_id: args.collaborator,
            };
            let page = api
                .list_projects(&filters)
                .await
                .context("failed to list projects")?;
            output.emit(&page.items, |projects| print_table(projects))
        }
        ProjectsCommand::Get { id } => {
            let project = api
                .get_project(&id)
                .await
                .with_context(|| format!("failed to fetch project {id}"))?;
            output.emit(&project, print_details)
        }
        ProjectsCommand::Create(args) => {
            if !permissions.create_project {
                bail!("only managers can create projects");
            }
            let request = CreateProjectRequest {
                name: args.name,
                description: args.description,
                deadline: args.deadline.map(deadline),
                technologies: (!args.technologies.is_empty()).then_some(args.technologies),
                collaborator_ids: args.collaborators,
            };
            let project = api
                .create_project(&request)
                .await
                .context("failed to create project")?;
            output.emit(&project, |project| {
                println!("Created {} ({})", project.name, project.id);
            })
        }
        ProjectsCommand::Update(args) => {
            if !permissions.update_project {
                bail!("only managers can update projects");
            }
            let request = UpdateProjectRequest {
                name: args.name,
                description: args.description,
                deadline: args.deadline.map(deadline),
                technologies: args.technologies,
                status: args.status,
                collaborator_ids: args.collaborators,
            };
            if request.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            let project = api
                .update_project(&args.id, &request)
                .await
                .with_context(|| format!("failed to update project {}", args.id))?;
            output.emit(&project, print_details)
        }
        ProjectsCommand::Delete { id, yes } => {
            if !permissions.delete_project {
                bail!("only managers can delete projects");
            }
            if !confirm(&format!("Delete project {id}?"), yes)? {
                println!("Aborted.");
                return Ok(());
            }
            api.delete_project(&id)
                .await
                .with_context(|| format!("failed to delete project {id}"))?;
            println!("Deleted project {id}.");
            Ok(())
        }
    }
}

fn deadline(date: NaiveDate) -> Timestamp {
    Timestamp(date.and_time(NaiveTime::MIN).and_utc())
}

fn print_table(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }
    println!("{:<28} {:<12} {:<12} {}", "NAME", "STATUS", "DEADLINE", "TEAM");
    for project in projects {
        println!(
            "{:<28} {:<12} {:<12} {}",
            truncate(&project.name, 28),
            project.status.label(),
            project
                .deadline
                .map_or_else(|| "-".to_string(), |deadline| format_date(&deadline.0)),
            project.collaborators.len()
        );
    }
}

fn print_details(project: &Project) {
    println!("{} ({})", project.name, project.id);
    println!("status: {}", project.status.label());
    if let Some(description) = &project.description {
        println!("description: {description}");
    }
    if let Some(deadline) = project.deadline {
        println!("deadline: {}", format_date(&deadline.0));
    }
    if let Some(technologies) = &project.technologies {
        println!("technologies: {}", technologies.join(", "));
    }
    for collaborator in &project.collaborators {
        println!("collaborator: {} <{}>", collaborator.name, collaborator.email);
    }
    println!(
        "created {} (updated {})",
        format_date(&project.created_at.0),
        format_relative(&project.updated_at.0, &Utc::now())
    );
}
