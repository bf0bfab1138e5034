use crate::infra::open_store;
use clap::Args;
use job_board::board::{
    AccountId, AccountRegistration, JobBoardService, ListingSubmission, RecordStore,
};
use job_board::config::StorageConfig;
use job_board::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seed a SQLite database instead of an in-memory store.
    #[arg(long)]
    pub(crate) database_url: Option<String>,
    /// Search term to run against the seeded listings.
    #[arg(long, default_value = "ac")]
    pub(crate) search: String,
}

struct SeedListing {
    title: &'static str,
    company: &'static str,
    location: &'static str,
    salary: &'static str,
    description: &'static str,
}

const SEED_LISTINGS: [SeedListing; 3] = [
    SeedListing {
        title: "Engineer",
        company: "Acme",
        location: "NYC",
        salary: "120000",
        description: "Design and ship backend services.",
    },
    SeedListing {
        title: "Cook",
        company: "Bistro",
        location: "LA",
        salary: "52000.50",
        description: "Run the line on weekend dinner service.",
    },
    SeedListing {
        title: "Data Analyst",
        company: "Northwind",
        location: "Chicago",
        salary: "78500",
        description: "Own weekly sales reporting.",
    },
];

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        database_url,
        search,
    } = args;

    let store = open_store(&StorageConfig { database_url }).await?;
    let service = JobBoardService::new(store);

    println!("Job board demo");
    let poster = register(&service, "Priya Patel", "priya@example.com", "Boston").await?;
    let seeker = register(&service, "Sam Okafor", "sam@example.com", "Denver").await?;

    let mut posted = Vec::new();
    for seed in &SEED_LISTINGS {
        let listing = service
            .create_listing(ListingSubmission {
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                company: seed.company.to_string(),
                location: seed.location.to_string(),
                salary: seed.salary.to_string(),
                user_id: Some(poster.0),
            })
            .await?;
        println!(
            "- Posted #{} {} at {} ({}) paying {}",
            listing.id, listing.title, listing.company, listing.location, listing.salary
        );
        posted.push(listing);
    }

    let results = service.search(Some(&search)).await?;
    println!("\nSearch for '{}' -> {} match(es)", search, results.len());
    for listing in &results {
        println!("- {} | {} | {}", listing.title, listing.company, listing.location);
    }

    for listing in results.iter().take(2) {
        service.create_application(seeker, listing.id).await?;
    }

    let profile = service.profile(seeker).await?;
    println!(
        "\nProfile for {} ({}, {})",
        profile.account, profile.account.email, profile.account.city
    );
    if profile.applications.is_empty() {
        println!("Applications: none");
    } else {
        println!("Applications:");
        for summary in &profile.applications {
            println!(
                "- {} [{}] on {}",
                summary,
                summary.application.status.label(),
                summary.application.applied_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
    }

    let poster_listings = service.listings_posted_by(poster).await?;
    println!(
        "\n{} has {} open listing(s)",
        service.get_account(poster).await?,
        poster_listings.len()
    );

    Ok(())
}

async fn register<S>(
    service: &JobBoardService<S>,
    name: &str,
    email: &str,
    city: &str,
) -> Result<AccountId, AppError>
where
    S: RecordStore + ?Sized + 'static,
{
    let account = service
        .create_account(AccountRegistration {
            name: name.to_string(),
            email: email.to_string(),
            password: format!("{}-demo", email),
            city: city.to_string(),
        })
        .await?;
    println!("- Registered {} <{}>", account, account.email);
    Ok(account.id)
}
