// System status display: watermark, reshare counts, recent activity.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;

use crate::db::models::ReshareResult;
use crate::db::Store;

/// Display system status to the terminal.
pub async fn show(store: &Arc<dyn Store>, db_display_path: &str) -> Result<()> {
    if !Path::new(db_display_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `retootbot init` to set up the database.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let watermark = store.watermark().await?;
    match store.watermark_updated_at().await? {
        Some(at) if watermark.0 > 0 => {
            println!("Notification watermark: {} (advanced {})", watermark, at)
        }
        _ => println!("Notification watermark: {} (never polled)", watermark),
    }

    let total = store.reshare_count().await?;
    let recent = store.recent_reshares(5).await?;
    println!("Posts handled: {}", total);
    if recent.is_empty() {
        println!("  Run `retootbot run` to start answering mentions");
    } else {
        println!("Most recent:");
        for record in &recent {
            let result = match record.result {
                ReshareResult::Reshared(_) => record.result.to_string().as_str().green(),
                ReshareResult::Declined => record.result.to_string().as_str().yellow(),
            };
            println!("  {} {} ({})", record.original_id, result, record.created_at);
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(12), "12 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
