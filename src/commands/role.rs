use anyhow::Result;
use attendance_core::role::{DerivedRole, DomainConfig};
use owo_colors::OwoColorize;

pub fn run(domains: &DomainConfig, email: &str) -> Result<()> {
    let derived = domains.derive(email);

    let kind = match derived {
        DerivedRole::Student => "student account",
        DerivedRole::Employee => "employee account",
        DerivedRole::Guest => "guest account",
    };
    println!("{} {}", email.bold(), kind);

    match derived.fixed_role() {
        Some(role) => println!("   role is always {role}"),
        None => {
            let roles: Vec<String> = derived.allowed_roles().iter().map(|r| r.to_string()).collect();
            println!("   chooses one of: {}", roles.join(", "));
        }
    }
    Ok(())
}
