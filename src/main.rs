// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;
use std::path::Path;

// Use library instead of local modules
use recommend_dashboard::{
    export_recommendations, import_account_numbers, write_template, AccountWorkingSet, ApiClient,
    TEMPLATE_FILENAME,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("template") => run_template(args.get(2).map(String::as_str))?,
        Some("batch") => {
            let file = args
                .get(2)
                .map(String::as_str)
                .ok_or_else(|| anyhow::anyhow!("Usage: recommend-dashboard batch <file.xlsx> [--csv]"))?;
            let export_csv = args.iter().any(|a| a == "--csv");
            run_batch(file, export_csv)?;
        }
        Some("lookup") => {
            let account = args
                .get(2)
                .map(String::as_str)
                .ok_or_else(|| anyhow::anyhow!("Usage: recommend-dashboard lookup <account>"))?;
            run_lookup(account)?;
        }
        Some(other) => {
            eprintln!("Unknown mode: {}", other);
            eprintln!("Modes: template [path] | batch <file.xlsx> [--csv] | lookup <account>");
            eprintln!("Run without arguments to start the dashboard UI.");
            std::process::exit(2);
        }
        None => run_ui_mode()?,
    }

    Ok(())
}

fn run_template(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(TEMPLATE_FILENAME);

    println!("📄 Writing import template...");
    write_template(Path::new(path))?;
    println!("✓ Template written to {}", path);
    println!("  Fill the `account_number` column and import it in batch mode.");

    Ok(())
}

fn run_batch(file: &str, export_csv: bool) -> Result<()> {
    println!("📦 Batch Recommendations - Import → Submit → Export");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Import the spreadsheet
    println!("\n📂 Importing {}...", file);
    let mut working_set = AccountWorkingSet::new();
    let accounts = match import_account_numbers(Path::new(file), &working_set) {
        Ok(accounts) => accounts,
        Err(e) => bail!("{}", e),
    };
    println!("✓ Found {} account numbers", accounts.len());
    working_set.append_all(&accounts);

    // 2. Submit the batch
    let client = ApiClient::from_env()?;
    println!("\n🌐 Submitting to {}...", client.base_url());
    let customers = client.recommend_batch(working_set.as_slice())?;
    println!("✓ Received {} recommendations", customers.len());

    // 3. Print results
    println!();
    for customer in &customers {
        let products = customer
            .recommended_products
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {} | {} | cluster {} | {}",
            customer.account_number, customer.customer_name, customer.cluster, products
        );
    }

    // 4. Optional CSV export
    if export_csv {
        println!("\n💾 Exporting CSV...");
        let path = export_recommendations(Path::new("."), &customers)?;
        println!("✓ Wrote {}", path.display());
    }

    Ok(())
}

fn run_lookup(account: &str) -> Result<()> {
    let client = ApiClient::from_env()?;
    println!("🔍 Looking up account {} at {}...", account, client.base_url());

    let customer = client.customer(account)?;

    println!("\n  Customer:  {}", customer.customer_name);
    println!("  ID:        {}", customer.customer_id);
    println!("  Account:   {}", customer.account_number);
    println!("  Cluster:   {}", customer.cluster);
    println!("  Recommended products:");
    for product in &customer.recommended_products {
        println!("    • {} — {}", product.name, product.reason);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    println!("🖥️  Loading Recommendation Dashboard UI...\n");

    let client = ApiClient::from_env()?;
    println!("✓ API base: {}", client.base_url());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(client);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use CLI modes: template | batch | lookup");
    std::process::exit(1);
}
