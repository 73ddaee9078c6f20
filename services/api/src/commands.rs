use crate::infra::file_backed_service;
use candidate_report::candidates::{import, CandidateRecord, CandidateSubmission, IntakeGuard};
use candidate_report::config::AppConfig;
use candidate_report::error::AppError;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AddArgs {
    /// Full name
    #[arg(long)]
    pub(crate) name: String,
    /// Contact email address
    #[arg(long)]
    pub(crate) email: String,
    /// Institution, matched exactly against the allow-list
    #[arg(long)]
    pub(crate) institution: String,
    /// Degree program
    #[arg(long)]
    pub(crate) program: String,
    /// Grade average between 0 and 10
    #[arg(long)]
    pub(crate) average: String,
    /// Comma separated skills
    #[arg(long, value_delimiter = ',')]
    pub(crate) skills: Vec<String>,
}

impl From<AddArgs> for CandidateSubmission {
    fn from(args: AddArgs) -> Self {
        CandidateSubmission {
            name: Some(args.name),
            email: Some(args.email),
            institution: Some(args.institution),
            program: Some(args.program),
            average: Some(serde_json::Value::String(args.average)),
            skills: (!args.skills.is_empty()).then_some(args.skills),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV file with name,email,institution,program,average[,skills] columns
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Only show candidates that pass the eligibility policy
    #[arg(long)]
    pub(crate) eligible: bool,
}

pub(crate) fn run_add_candidate(args: AddArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    add_candidate(&config, args)
}

pub(crate) fn run_import_candidates(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    import_candidates(&config, args).map(|_| ())
}

pub(crate) fn run_list_candidates(args: ListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = file_backed_service(&config)?;
    let candidates = if args.eligible {
        service.shortlist()?
    } else {
        service.list_candidates()?
    };

    if candidates.is_empty() {
        println!("No candidates stored");
        return Ok(());
    }

    for candidate in &candidates {
        println!("{}", describe(candidate));
    }
    Ok(())
}

pub(crate) fn run_generate_report() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = file_backed_service(&config)?;
    let report = service.generate_report()?;

    println!(
        "Report written to {} ({} candidates, {} pages)",
        config.storage.report_path.display(),
        report.candidate_count,
        report.page_count
    );
    if report.flagged_count > 0 {
        println!(
            "  {} candidate(s) skipped because their average could not be rendered",
            report.flagged_count
        );
    }
    Ok(())
}

fn add_candidate(config: &AppConfig, args: AddArgs) -> Result<(), AppError> {
    let record = IntakeGuard.admit(args.into())?;
    let service = file_backed_service(config)?;
    println!("Adding {}", describe(&record));
    service.add_candidate(record)?;
    Ok(())
}

fn import_candidates(config: &AppConfig, args: ImportArgs) -> Result<usize, AppError> {
    let records = import::records_from_path(&args.path)?;
    let service = file_backed_service(config)?;
    let count = records.len();
    for record in records {
        service.add_candidate(record)?;
    }
    println!("Imported {count} candidate(s) from {}", args.path.display());
    Ok(count)
}

fn describe(candidate: &CandidateRecord) -> String {
    format!(
        "{} <{}> {} / {} ({})",
        candidate.name, candidate.email, candidate.institution, candidate.program, candidate.average
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_support::config_in;
    use std::fs;

    fn add_args(name: &str, average: &str) -> AddArgs {
        AddArgs {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            institution: "Universidad A".to_string(),
            program: "Física".to_string(),
            average: average.to_string(),
            skills: Vec::new(),
        }
    }

    #[test]
    fn add_appends_validated_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        add_candidate(&config, add_args("Ana", "8.5")).expect("add");

        let stored = file_backed_service(&config)
            .unwrap()
            .list_candidates()
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].average, 8.5);
        assert_eq!(stored[0].skills, None);
    }

    #[test]
    fn add_rejects_invalid_average_without_touching_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let result = add_candidate(&config, add_args("Ana", "eleven"));

        assert!(matches!(result, Err(AppError::Intake(_))));
        assert!(!config.storage.candidates_path.exists());
    }

    #[test]
    fn import_appends_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let csv = dir.path().join("candidates.csv");
        fs::write(
            &csv,
            "name,email,institution,program,average\n\
             Ana,ana@example.com,Universidad A,Física,8.1\n\
             Bo,bo@example.com,Universidad B,Química,9.0\n",
        )
        .unwrap();

        let count = import_candidates(&config, ImportArgs { path: csv }).expect("import");

        assert_eq!(count, 2);
        let names: Vec<String> = file_backed_service(&config)
            .unwrap()
            .list_candidates()
            .unwrap()
            .into_iter()
            .map(|candidate| candidate.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bo"]);
    }

    #[test]
    fn import_with_bad_row_appends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let csv = dir.path().join("candidates.csv");
        fs::write(
            &csv,
            "name,email,institution,program,average\n\
             Ana,ana@example.com,Universidad A,Física,8.1\n\
             Bo,bo-at-example,Universidad B,Química,9.0\n",
        )
        .unwrap();

        let result = import_candidates(&config, ImportArgs { path: csv });

        assert!(matches!(result, Err(AppError::Import(_))));
        assert!(!config.storage.candidates_path.exists());
    }
}
