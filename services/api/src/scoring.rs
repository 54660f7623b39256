use crate::cli::ArtifactArgs;
use crate::infra::{load_config, load_service};
use clap::Args;
use loan_approval::batch::views::BatchReportView;
use loan_approval::error::AppError;
use loan_approval::inference::{suggested_loan_percent_income, ApplicantRecord};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    #[arg(long)]
    pub(crate) person_age: i64,
    /// female | male
    #[arg(long)]
    pub(crate) person_gender: String,
    /// Associate | Bachelor | Doctorate | High School | Master
    #[arg(long)]
    pub(crate) person_education: String,
    /// Annual income
    #[arg(long)]
    pub(crate) person_income: f64,
    /// MORTGAGE | OTHER | OWN | RENT
    #[arg(long)]
    pub(crate) person_home_ownership: String,
    /// No | Yes
    #[arg(long)]
    pub(crate) previous_loan_defaults_on_file: String,
    #[arg(long)]
    pub(crate) loan_amnt: f64,
    /// Interest rate in percent
    #[arg(long)]
    pub(crate) loan_int_rate: f64,
    /// Loan amount over income. Derived from the two when omitted.
    #[arg(long)]
    pub(crate) loan_percent_income: Option<f64>,
    #[arg(long)]
    pub(crate) credit_score: i64,
    /// DEBTCONSOLIDATION | EDUCATION | HOMEIMPROVEMENT | MEDICAL | PERSONAL | VENTURE
    #[arg(long)]
    pub(crate) loan_intent: String,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Applicant CSV with a header row
    pub(crate) input: PathBuf,
    /// Write the scored table here instead of printing a summary only
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Preview rows with at least this approval probability
    #[arg(long)]
    pub(crate) min_probability: Option<f32>,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

impl PredictArgs {
    fn into_record(self) -> (ApplicantRecord, ArtifactArgs) {
        let loan_percent_income = self.loan_percent_income.unwrap_or_else(|| {
            suggested_loan_percent_income(self.loan_amnt, self.person_income).unwrap_or(0.0)
        });

        let record = ApplicantRecord {
            person_age: self.person_age,
            person_gender: self.person_gender,
            person_education: self.person_education,
            person_income: self.person_income,
            person_home_ownership: self.person_home_ownership,
            previous_loan_defaults_on_file: self.previous_loan_defaults_on_file,
            loan_amnt: self.loan_amnt,
            loan_int_rate: self.loan_int_rate,
            loan_percent_income,
            credit_score: self.credit_score,
            loan_intent: self.loan_intent,
        };
        (record, self.artifacts)
    }
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let (record, artifacts) = args.into_record();
    let config = load_config(artifacts)?;
    let service = load_service(&config)?;

    let response = service.predict(&record)?;
    println!("Loan approval prediction");
    println!("- {}", response.summary);
    println!(
        "- Approval probability: {:.1}% ({})",
        response.probability * 100.0,
        response.label.label()
    );
    if response.advisories.is_empty() {
        println!("Advisories: none");
    } else {
        println!("Advisories:");
        for advisory in &response.advisories {
            println!("  - {}", advisory.message);
        }
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        output,
        min_probability,
        artifacts,
    } = args;

    let config = load_config(artifacts)?;
    let service = load_service(&config)?;
    let settings = service.settings();

    let upload = std::fs::File::open(&input)?;
    let report = service.score_batch(upload)?;
    let min_probability = min_probability.unwrap_or(settings.preview_threshold);
    let view = BatchReportView::build(&report, min_probability, settings.preview_limit);

    println!("Batch predictions for {}", input.display());
    println!(
        "- {} rows | {} scored | {} failed | {} likely approved",
        view.summary.total, view.summary.scored, view.summary.failed, view.summary.approved
    );

    if view.preview.is_empty() {
        println!("\nNo rows with approval probability >= {min_probability:.2}");
    } else {
        println!("\nRows with approval probability >= {min_probability:.2}");
        for row in &view.preview {
            println!(
                "  - row {}: {} ({:.1}%)",
                row.row,
                row.label.label(),
                row.approval_prob * 100.0
            );
        }
    }

    if !view.errors.is_empty() {
        println!("\nRows not scored");
        for error in &view.errors {
            println!("  - row {}: {}", error.row, error.error);
        }
    }

    if let Some(output) = output {
        std::fs::write(&output, report.to_csv()?)?;
        println!("\nScored table written to {}", output.display());
    }

    Ok(())
}
