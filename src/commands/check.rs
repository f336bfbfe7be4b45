//! Check command implementation.
//!
//! Validates process table access and configuration.

use std::path::Path;

use jtop::config::{Config, Settings};
use jtop::process::{read_process, UserTable};

use crate::startup_checks::check_proc_access;

/// Validates system requirements and configuration.
///
/// Returns an error when any check fails, after printing every result.
pub fn command_check(proc_root: &Path, config: &Config) -> anyhow::Result<()> {
    println!("🔍 jtop - System Check");
    println!("======================");

    let mut all_ok = true;

    println!("\n📁 Checking {} ...", proc_root.display());
    match check_proc_access(proc_root) {
        Ok(count) => println!("   ✅ {} processes visible", count),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    // Our own entry must always be readable
    let own_pid = std::process::id();
    let own_path = proc_root.join(own_pid.to_string());
    match read_process(&own_path, own_pid, &UserTable::system()) {
        Ok(record) => println!(
            "   ✅ Own process {} readable (user {}, command {:?})",
            own_pid,
            record.owner_name().unwrap_or("?"),
            record.command
        ),
        Err(e) => {
            println!("   ❌ Own process unreadable: {}", e);
            all_ok = false;
        }
    }

    println!("\n⚙️  Checking configuration...");
    match Settings::from_config(config) {
        Ok(settings) => {
            println!("   ✅ Configuration is valid");
            println!(
                "   refresh every {:?}, sort by {}",
                settings.delay, settings.view.sort
            );
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed");
        Ok(())
    } else {
        println!("   ❌ Some checks failed");
        anyhow::bail!("system check failed")
    }
}
