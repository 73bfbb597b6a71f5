//! Basic example demonstrating the Veracross API client.
//!
//! Run with:
//! ```
//! VERACROSS_SCHOOL_ROUTE=my_school \
//! VERACROSS_CLIENT_ID=... VERACROSS_CLIENT_SECRET=... \
//! VERACROSS_SCOPES="students:list academics.classes:list" \
//!     cargo run --example basic
//! ```

use veracross::{Request, VeracrossClient};

#[tokio::main]
async fn main() -> veracross::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Veracross client...");
    let client = VeracrossClient::from_env().await?;
    println!("Connected to: {}", client.base_url());

    if !client.is_authenticated() {
        println!("Token request was rejected; check the client id, secret and scopes.");
        return Ok(());
    }

    // List every student in grade 9
    println!("\n--- Listing Students ---");
    let fetched = client
        .fetch("students.list", &Request::new().query("grade_level", 9))
        .await?;
    println!(
        "Found {} students in {} requests (complete: {})",
        fetched.table.len(),
        fetched.requests,
        fetched.is_complete()
    );

    for student in fetched.table.iter().take(10) {
        println!(
            "  - {} {}",
            student.get("first_name").and_then(|v| v.as_str()).unwrap_or("?"),
            student.get("last_name").and_then(|v| v.as_str()).unwrap_or("?")
        );
    }

    // List classes with nested objects expanded into columns
    println!("\n--- Listing Classes ---");
    let classes = client
        .call("academics.classes.list", &Request::new().page_size(200))
        .await
        .flatten(&["course", "school_year"]);
    println!("{classes}");

    Ok(())
}
