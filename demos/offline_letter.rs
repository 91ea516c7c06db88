//! Reads the whole letter without a network connection and prints it.
//!
//! Run with: cargo run --example offline_letter [-- --batch]

use std::sync::Arc;

use sakura_letter::{
    narrative::{Session, Variant},
    provider::OfflineGenerator,
    transcript,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let variant = if std::env::args().any(|a| a == "--batch") {
        Variant::Proposal
    } else {
        Variant::Letter
    };

    let mut session = Session::new(Arc::new(OfflineGenerator), variant);
    let letter = transcript::read_through(&mut session).await;
    print!("{letter}");

    println!(
        "\n({} generation requests, all answered from fallbacks)",
        session.provider().requests_issued()
    );
    Ok(())
}
