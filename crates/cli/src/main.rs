use chrono::Utc;
use clap::{Parser, Subcommand};
use medwise_core::{
    config::config_from_env_values, BasicInfo, EmergencyContact, Gender, HealthcareInfo,
    ManualEntry, MedicalRecord, RecordPatch, RecordStore, RecordType, UserProfile, VitalSigns,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medwise")]
#[command(about = "MedWise health record CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all records
    List,
    /// Show one record as JSON
    Show {
        /// Record id
        id: String,
    },
    /// Add a captured document as a placeholder record
    Add {
        /// Record type (lab_report, prescription, scan, consultation, other)
        #[arg(long = "type", default_value = "other")]
        record_type: RecordType,
        /// Location of the captured photo or document
        #[arg(long)]
        file_uri: Option<String>,
        /// Title (defaults to "New <type>")
        #[arg(long)]
        title: Option<String>,
    },
    /// Enter a record by hand, one wizard step per group of flags
    ManualEntry {
        #[arg(long, default_value_t)]
        title: String,
        #[arg(long = "type", default_value = "consultation")]
        record_type: RecordType,
        #[arg(long, default_value_t)]
        description: String,
        #[arg(long, default_value_t)]
        doctor: String,
        #[arg(long, default_value_t)]
        hospital: String,
        /// e.g. 120/80
        #[arg(long, default_value_t)]
        blood_pressure: String,
        #[arg(long, default_value_t)]
        heart_rate: String,
        #[arg(long, default_value_t)]
        temperature: String,
        #[arg(long, default_value_t)]
        weight: String,
        #[arg(long, default_value_t)]
        height: String,
        /// Comma-separated medication names
        #[arg(long, default_value_t)]
        medications: String,
        #[arg(long, default_value_t)]
        diagnosis: String,
    },
    /// Update fields of an existing record (an empty value clears an optional field)
    Update {
        /// Record id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        file_uri: Option<String>,
        #[arg(long)]
        doctor: Option<String>,
        #[arg(long)]
        hospital: Option<String>,
    },
    /// Delete every record with the given id
    Delete {
        /// Record id
        id: String,
    },
    /// Show or replace the user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Remove all records, the profile and the chat history
    Clear {
        /// Required to actually delete anything
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the stored profile
    Show,
    /// Replace the stored profile
    Set {
        name: String,
        age: u32,
        /// male, female or other
        gender: Gender,
        /// One of A+, A-, B+, B-, AB+, AB-, O+, O-
        blood_type: String,
        /// Emergency contact name
        contact_name: String,
        /// Emergency contact phone
        contact_phone: String,
        /// Allergy (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,
        /// Chronic condition (repeatable)
        #[arg(long = "condition")]
        chronic_conditions: Vec<String>,
    },
}

fn print_summary(record: &MedicalRecord) {
    println!(
        "ID: {}, Date: {}, Type: {}, Title: {}",
        record.id,
        record.date.format("%Y-%m-%d %H:%M"),
        record.record_type.label(),
        record.title
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medwise_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = config_from_env_values(
        std::env::var("MEDWISE_DATA_DIR").ok(),
        std::env::var("MEDWISE_NAMESPACE").ok(),
    )?;
    let store = RecordStore::open(&cfg).await?;

    match cli.command {
        Some(Commands::List) => {
            let records = store.get_medical_records().await?;
            if records.is_empty() {
                println!("No records found.");
            } else {
                for record in &records {
                    print_summary(record);
                }
            }
        }
        Some(Commands::Show { id }) => match store.get_medical_record(&id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => anyhow::bail!("No record with ID: {}", id),
        },
        Some(Commands::Add {
            record_type,
            file_uri,
            title,
        }) => {
            let mut record = MedicalRecord::captured(
                store.new_record_id(),
                Utc::now(),
                record_type,
                file_uri,
            );
            if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
                record.title = title;
            }
            store.save_medical_record(record.clone()).await?;
            println!("Added record with ID: {}", record.id);
        }
        Some(Commands::ManualEntry {
            title,
            record_type,
            description,
            doctor,
            hospital,
            blood_pressure,
            heart_rate,
            temperature,
            weight,
            height,
            medications,
            diagnosis,
        }) => {
            let entry = ManualEntry::new().submit(BasicInfo {
                title,
                record_type,
                description,
            });
            tracing::debug!(
                "manual entry at step {} ({})",
                entry.step_number(),
                entry.step_name()
            );
            let entry = entry.submit(HealthcareInfo {
                doctor_name: doctor,
                hospital_name: hospital,
            });
            let vitals = VitalSigns {
                blood_pressure,
                heart_rate,
                temperature,
                weight,
                height,
                medications,
                diagnosis,
            };
            let (record, _) = entry.commit(vitals, &store).await?;
            println!("Saved manual entry with ID: {}", record.id);
            print_summary(&record);
        }
        Some(Commands::Update {
            id,
            title,
            description,
            file_uri,
            doctor,
            hospital,
        }) => {
            let patch = RecordPatch {
                title,
                description,
                file_uri,
                doctor_name: doctor,
                hospital_name: hospital,
                extracted_data: None,
            };
            let record = store.update_medical_record(&id, &patch).await?;
            println!("Updated record with ID: {}", record.id);
        }
        Some(Commands::Delete { id }) => {
            let removed = store.delete_medical_record(&id).await?;
            if removed == 0 {
                println!("No record with ID: {}", id);
            } else {
                println!("Deleted {} record(s) with ID: {}", removed, id);
            }
        }
        Some(Commands::Profile { command }) => match command {
            ProfileCommands::Show => match store.get_user_profile().await? {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => println!("No profile saved."),
            },
            ProfileCommands::Set {
                name,
                age,
                gender,
                blood_type,
                contact_name,
                contact_phone,
                allergies,
                chronic_conditions,
            } => {
                let profile = UserProfile {
                    name,
                    age,
                    gender,
                    blood_type,
                    allergies,
                    emergency_contact: EmergencyContact {
                        name: contact_name,
                        phone: contact_phone,
                    },
                    chronic_conditions,
                };
                store.save_user_profile(&profile).await?;
                println!("Saved profile for {}", profile.name);
            }
        },
        Some(Commands::Clear { yes }) => {
            if !yes {
                anyhow::bail!("Refusing to delete all data without --yes");
            }
            store.clear_all_data().await?;
            println!("All data cleared.");
        }
        None => {
            println!("Use 'medwise --help' for commands");
        }
    }

    Ok(())
}
