//! Run summary printing.

use std::path::Path;

use event_log::{run_file_name, LATEST_FILE_NAME};
use scheduler::RunSummary;

/// Path of the per-run log written by `summary`'s run
pub fn run_log_path(summary: &RunSummary) -> std::path::PathBuf {
    Path::new(&summary.run.out_dir).join(run_file_name(summary.run.wall_start_time_ns))
}

/// Print a human-readable run report to stdout
pub fn print_summary(summary: &RunSummary) {
    let counters = &summary.counters;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Run Summary                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📊 Overview");
    println!("   ├─ Node: {}", summary.run.node_id);
    println!("   ├─ Stop reason: {}", summary.stop_reason);
    println!("   ├─ Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("   ├─ Ticks: {}", counters.ticks);
    println!("   ├─ Frames: {}", counters.frames);
    println!("   └─ FPS: {:.2}", summary.fps());

    println!("\n📈 Frames");
    println!("   ├─ Points total: {}", counters.points);
    println!("   ├─ Points per frame: {}", summary.frame_points());
    println!("   ├─ Replay resets: {}", counters.resets);
    println!("   └─ Tick overruns: {}", counters.overruns);

    println!("\n🧾 Event log");
    println!("   ├─ Heartbeats: {}", counters.heartbeats);
    println!("   ├─ Frame stats: {}", counters.frame_events);
    println!("   ├─ Run file: {}", run_log_path(summary).display());
    println!(
        "   ├─ Latest: {}",
        Path::new(&summary.run.out_dir).join(LATEST_FILE_NAME).display()
    );
    println!("   ├─ Config hash: {}", summary.run.config_hash);
    println!("   └─ Calibration hash: {}", summary.run.calibration_hash);

    println!();
}
