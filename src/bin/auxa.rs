//! Auxa CLI - Command-line interface for the Auxa lighting engine
//!
//! Commands:
//! - compute: Derive settings for one or more profiles
//! - validate: Check profiles without computing settings
//! - doctor: Diagnose engine health and environment
//! - schema: Describe the input and output formats

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use auxa_lighting::engine::{calculate_comfort_settings, LightingEngine};
use auxa_lighting::profile::{parse_profiles_array, parse_profiles_ndjson, ProfileReport, UserProfile};
use auxa_lighting::{ENGINE_VERSION, PRODUCER_NAME, SETTINGS_SCHEMA_VERSION};

/// Auxa - Lighting policy engine for sensory profiles
#[derive(Parser)]
#[command(name = "auxa")]
#[command(author = "Auxa")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Derive lighting comfort settings from sensory profiles", long_about = None)]
struct Cli {
    /// Log engine decisions to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive settings for one or more profiles
    Compute {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Which settings to emit
        #[arg(long, default_value = "all")]
        section: Section,

        /// Wrap each result in a settings payload envelope
        #[arg(long)]
        envelope: bool,
    },

    /// Check profiles without computing settings
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// A single profile object, or an array of profiles
    Json,
    /// Newline-delimited JSON (one profile per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one result per line)
    Ndjson,
    /// JSON array of results
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum Section {
    All,
    Lighting,
    Notifications,
    Stress,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Questionnaire profile document
    Input,
    /// Settings payload (auxa.settings.v1)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("auxa_lighting=debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AuxaCliError> {
    match cli.command {
        Commands::Compute {
            input,
            output,
            input_format,
            output_format,
            section,
            envelope,
        } => cmd_compute(&input, &output, input_format, output_format, section, envelope),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { json } => cmd_doctor(json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn read_input(input: &Path) -> Result<String, AuxaCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_profiles(input: &Path, format: InputFormat) -> Result<Vec<UserProfile>, AuxaCliError> {
    let data = read_input(input)?;
    let profiles = match format {
        InputFormat::Ndjson => parse_profiles_ndjson(&data)?,
        InputFormat::Json => {
            if data.trim_start().starts_with('[') {
                parse_profiles_array(&data)?
            } else {
                vec![UserProfile::from_json(&data)?]
            }
        }
    };

    if profiles.is_empty() {
        return Err(AuxaCliError::NoProfiles);
    }
    Ok(profiles)
}

fn cmd_compute(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    section: Section,
    envelope: bool,
) -> Result<(), AuxaCliError> {
    let profiles = read_profiles(input, input_format)?;
    let engine = LightingEngine::new();

    let mut results: Vec<serde_json::Value> = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        let value = if envelope {
            serde_json::to_value(engine.evaluate(profile)?)?
        } else {
            let settings = calculate_comfort_settings(profile)?;
            match section {
                Section::All => serde_json::to_value(&settings)?,
                Section::Lighting => serde_json::to_value(&settings.lighting)?,
                Section::Notifications => serde_json::to_value(settings.notifications)?,
                Section::Stress => serde_json::to_value(settings.stress_response)?,
            }
        };
        results.push(value);
    }

    let output_data = format_output(&results, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), AuxaCliError> {
    let profiles = read_profiles(input, input_format)?;
    let reports: Vec<ProfileReport> = profiles.iter().map(UserProfile::validate).collect();
    let invalid = reports.iter().filter(|r| !r.valid).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total profiles:   {}", reports.len());
        println!("Valid profiles:   {}", reports.len() - invalid);
        println!("Invalid profiles: {}", invalid);

        for (index, report) in reports.iter().enumerate() {
            if let Some(error) = &report.sensitivity_error {
                println!("  - Profile {}: {}", index, error);
            }
            for tag in &report.unrecognized_tags {
                println!(
                    "  - Profile {}: unrecognized {} tag '{}' (ignored)",
                    index, tag.field, tag.value
                );
            }
        }
    }

    if invalid > 0 {
        Err(AuxaCliError::ValidationFailed(invalid))
    } else {
        Ok(())
    }
}

fn cmd_doctor(json: bool) -> Result<(), AuxaCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {}", ENGINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Output schema: {}", SETTINGS_SCHEMA_VERSION),
    });

    // Smoke-test the pipeline on the neutral profile
    let smoke = match calculate_comfort_settings(&UserProfile::with_sensitivity(3)) {
        Ok(settings) if settings.lighting.has_no_overrides() => DoctorCheck {
            name: "pipeline".to_string(),
            status: CheckStatus::Ok,
            message: "Reference profile computed".to_string(),
        },
        Ok(_) => DoctorCheck {
            name: "pipeline".to_string(),
            status: CheckStatus::Warning,
            message: "Reference profile produced unexpected overrides".to_string(),
        },
        Err(e) => DoctorCheck {
            name: "pipeline".to_string(),
            status: CheckStatus::Error,
            message: format!("Reference profile failed: {}", e),
        },
    };
    checks.push(smoke);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Auxa Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(AuxaCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), AuxaCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: questionnaire profile document (JSON object)");
                println!();
                println!("Required:");
                println!("- lightSensitivity: integer 1-5 (number or numeric string)");
                println!();
                println!("Optional single-choice answers (exact values; anything else = unspecified):");
                println!("- overwhelmedByLight, lightNeedsChange, manualOverride, trackEffectiveness: yes | no");
                println!("- notificationPreference: always | only_sometimes | never");
                println!("- stressAwareness: always | sometimes | rarely | never");
                println!("- comfortWithAdjustments: yes | no | only_if_i_can_undo_it");
                println!();
                println!("Optional tag lists (exact values; unknown tags are ignored):");
                println!("- primaryUsage (any case): Home, School, Workplace, Clinic, Outdoors, Other");
                println!("- uncomfortableLightTypes: Flickering lights, Bright white");
                println!("- lightReactions: Headaches, Nausea, Anxiety, Trouble focusing");
                println!("- stressCopingMethods: Turn off lights, Leave the room");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: {}", SETTINGS_SCHEMA_VERSION);
                println!();
                println!("- schemaVersion, producer {{ name, version, instanceId }}, computedAtUtc");
                println!("- sensitivityLevel: high | moderate | low");
                println!("- settings:");
                println!("  - lighting: {{ default, calmMode?, taskMode?, timeBased?, locationBased }}");
                println!("    bands: {{ brightness {{min,max}} lux, colorTemp {{min,max}} K, transitionSpeed?, flickerFree? }}");
                println!("  - notifications: {{ notifyOnAdjustment, notifyOnSignificantChange, checkInIntervalMinutes, allowManualOverride, trackEffectiveness }}");
                println!("  - stressResponse: {{ enableCalmMode, gradualDimming, undoTimeoutSeconds, automaticAdjustments }}");
                println!("- warnings: unrecognized tags, inverted ranges");
            }
        }
    }

    Ok(())
}

// Helper functions

fn format_output(
    results: &[serde_json::Value],
    format: &OutputFormat,
) -> Result<String, AuxaCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for result in results {
                lines.push(serde_json::to_string(result)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(results)? + "\n"),
        OutputFormat::JsonPretty => {
            // A single result is printed bare rather than as a one-element array
            let pretty = match results {
                [single] => serde_json::to_string_pretty(single)?,
                _ => serde_json::to_string_pretty(results)?,
            };
            Ok(pretty + "\n")
        }
    }
}

fn get_input_json_schema() -> String {
    let yes_no = serde_json::json!({ "type": ["string", "null"] });
    let tags = serde_json::json!({ "type": ["array", "string", "null"], "items": { "type": "string" } });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "auxa.profile",
        "description": "Sensory-profile questionnaire answers",
        "type": "object",
        "required": ["lightSensitivity"],
        "properties": {
            "lightSensitivity": {
                "type": ["number", "string"],
                "minimum": 1,
                "maximum": 5
            },
            "overwhelmedByLight": yes_no,
            "lightNeedsChange": yes_no,
            "manualOverride": yes_no,
            "trackEffectiveness": yes_no,
            "notificationPreference": { "type": ["string", "null"] },
            "stressAwareness": { "type": ["string", "null"] },
            "comfortWithAdjustments": { "type": ["string", "null"] },
            "primaryUsage": tags,
            "uncomfortableLightTypes": tags,
            "lightReactions": tags,
            "stressCopingMethods": tags
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let bounds = serde_json::json!({
        "type": "object",
        "required": ["min", "max"],
        "properties": { "min": { "type": "integer" }, "max": { "type": "integer" } }
    });
    let band = serde_json::json!({
        "type": "object",
        "required": ["brightness", "colorTemp"],
        "properties": {
            "brightness": bounds,
            "colorTemp": bounds,
            "transitionSpeed": { "enum": ["very_slow", "slow", "medium", "fast"] },
            "flickerFree": { "type": "boolean" }
        }
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SETTINGS_SCHEMA_VERSION,
        "description": "Auxa settings payload",
        "type": "object",
        "required": ["schemaVersion", "producer", "computedAtUtc", "sensitivityLevel", "settings", "warnings"],
        "properties": {
            "schemaVersion": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instanceId": { "type": "string" }
                }
            },
            "computedAtUtc": { "type": "string", "format": "date-time" },
            "sensitivityLevel": { "enum": ["high", "moderate", "low"] },
            "settings": {
                "type": "object",
                "properties": {
                    "lighting": {
                        "type": "object",
                        "required": ["default", "locationBased"],
                        "properties": {
                            "default": band,
                            "calmMode": band,
                            "taskMode": band,
                            "timeBased": { "type": "object", "additionalProperties": band },
                            "locationBased": { "type": "object" }
                        }
                    },
                    "notifications": { "type": "object" },
                    "stressResponse": { "type": "object" }
                }
            },
            "warnings": { "type": "array", "items": { "type": "string" } }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum AuxaCliError {
    Io(io::Error),
    Engine(auxa_lighting::LightingError),
    Json(serde_json::Error),
    NoProfiles,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for AuxaCliError {
    fn from(e: io::Error) -> Self {
        AuxaCliError::Io(e)
    }
}

impl From<auxa_lighting::LightingError> for AuxaCliError {
    fn from(e: auxa_lighting::LightingError) -> Self {
        AuxaCliError::Engine(e)
    }
}

impl From<serde_json::Error> for AuxaCliError {
    fn from(e: serde_json::Error) -> Self {
        AuxaCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<AuxaCliError> for CliError {
    fn from(e: AuxaCliError) -> Self {
        match e {
            AuxaCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            AuxaCliError::Engine(auxa_lighting::LightingError::InvalidProfile(msg)) => CliError {
                code: "INVALID_PROFILE".to_string(),
                message: msg,
                hint: Some("lightSensitivity must be an integer from 1 to 5".to_string()),
            },
            AuxaCliError::Engine(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'auxa schema input' for the expected format".to_string()),
            },
            AuxaCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            AuxaCliError::NoProfiles => CliError {
                code: "NO_PROFILES".to_string(),
                message: "No profiles found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            AuxaCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} profiles failed validation", count),
                hint: Some("Fix lightSensitivity answers and retry".to_string()),
            },
            AuxaCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
