use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use smart_scheduler::{
    render_gantt_svg, write_schedule_file, ChartConfig, CsvConfig, GreedyScheduler,
    SchedulingConfig, DEFAULT_OUTPUT_FILE,
};

#[derive(Parser, Debug)]
#[command(name = "smart-schedule")]
#[command(version)]
#[command(about = "Assign shop jobs to machines by priority and due date")]
struct Args {
    /// Jobs CSV (job_id, job_type, required_machine_type, priority, due_date, setup_time, processing_time)
    #[arg(default_value = "jobs.csv")]
    jobs: PathBuf,

    /// Machines CSV (machine_id, machine_type, available_at)
    #[arg(default_value = "machines.csv")]
    machines: PathBuf,

    /// Where to write the schedule CSV
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Also render a Gantt chart to this SVG file
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Field delimiter for input and output files
    #[arg(long, short = 'd', default_value_t = ',')]
    delimiter: char,

    /// Increase logging (-v changes, -vv checks, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let csv_config = CsvConfig {
        delimiter: args.delimiter,
        ..CsvConfig::default()
    };
    let scheduler = GreedyScheduler::new(SchedulingConfig {
        verbosity: args.verbose,
    });

    let result = scheduler.schedule_files(&args.jobs, &args.machines, &csv_config)?;
    write_schedule_file(&args.output, &result.entries, &csv_config)?;

    if let Some(chart_path) = &args.chart {
        std::fs::write(
            chart_path,
            render_gantt_svg(&result.entries, &ChartConfig::default()),
        )?;
        println!("Gantt chart written to {}", chart_path.display());
    }

    let summary = result.summary();
    println!(
        "Scheduled {} job(s) -> {}",
        summary.scheduled_count,
        args.output.display()
    );
    if !result.unscheduled_job_ids.is_empty() {
        println!(
            "No compatible machine for: {}",
            result.unscheduled_job_ids.join(", ")
        );
    }
    println!(
        "Late jobs: {} (total delay {:.2}h, max {:.2}h), makespan {:.2}h",
        summary.late_count,
        summary.total_delay_hours,
        summary.max_delay_hours,
        summary.makespan_hours()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to generate schedule: {e}");
            ExitCode::FAILURE
        }
    }
}
