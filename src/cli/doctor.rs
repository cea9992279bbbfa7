//! Environment readiness check.

use crate::devices::DEVICE_PROFILES;
use crate::session::find_chromium;
use anyhow::Result;
use std::process::Command;

/// Check Chromium availability, API configuration, and available memory.
pub async fn run() -> Result<()> {
    println!("Shutter Doctor");
    println!("==============");
    println!();

    // OS and architecture
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Check Chromium
    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Set SHUTTER_CHROMIUM_PATH or install google-chrome."
        ),
    }

    // Check storage API configuration
    let api_base = std::env::var("API_BASE_URL").ok().filter(|v| !v.is_empty());
    match &api_base {
        Some(base) => println!("[OK] API_BASE_URL: {base}"),
        None => println!("[!!] API_BASE_URL not set"),
    }
    if std::env::var("API_KEY").is_ok() {
        println!("[OK] API_KEY is set");
    } else {
        println!("[!!] API_KEY not set; uploads and run reports will be rejected");
    }

    // Check available memory
    let mem_mb = get_available_memory_mb();
    match mem_mb {
        Some(mb) => {
            if mb >= 512 {
                println!("[OK] Available memory: {mb}MB (>= 512MB required)");
            } else {
                println!("[!!] Available memory: {mb}MB (< 512MB; full-page renders may fail)");
            }
        }
        None => println!("[??] Could not determine available memory"),
    }

    println!();
    println!("Device profiles:");
    for profile in DEVICE_PROFILES {
        println!(
            "  {:<8} {}x{} @{}x",
            profile.name, profile.width, profile.height, profile.scale
        );
    }

    println!();
    let ready = chromium_path.is_some() && api_base.is_some();
    if ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
        if chromium_path.is_none() {
            println!("  Install Chromium or point SHUTTER_CHROMIUM_PATH at a binary.");
        }
        if api_base.is_none() {
            println!("  Export API_BASE_URL before running a capture batch.");
        }
    }

    Ok(())
}

/// Get available memory in MB (platform-specific).
fn get_available_memory_mb() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
        for line in meminfo.lines() {
            if let Some(rest) = line.strip_prefix("MemAvailable:") {
                let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
                return Some(kb / 1024);
            }
        }
        None
    }
    #[cfg(target_os = "macos")]
    {
        let output = Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        let bytes: u64 = s.trim().parse().ok()?;
        Some(bytes / 1_048_576)
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}
