use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use formwell_core::{AccountIdentity, AppError, AppResult};
use formwell_domain::{
    EntitlementSnapshot, Form, FormField, FormFieldInput, FormId, FormSchema, FormSettings,
    FormSettingsInput, Submission, billing_period_start, form_limit_message,
};

use crate::csv_export::{export_file_name, render_submissions_csv};
use crate::form_ports::{FormInsertOutcome, FormRepository, FormSummary, SubmissionRepository};
use crate::usage_service::UsageService;

/// Form content as submitted by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    /// Form name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Fields in display order.
    pub fields: Vec<FormFieldInput>,
    /// Presentation settings.
    pub settings: FormSettingsInput,
}

/// Owned form with its submissions in the current billing period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDetail {
    /// Form aggregate.
    pub form: Form,
    /// Submissions received since the start of the month.
    pub submissions_this_period: u64,
}

/// CSV download of a form's submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionExport {
    /// Suggested download file name.
    pub file_name: String,
    /// CSV document.
    pub csv: String,
}

/// Owner-scoped form management.
///
/// Forms owned by another account are reported as missing.
#[derive(Clone)]
pub struct FormService {
    forms: Arc<dyn FormRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    usage: UsageService,
}

impl FormService {
    /// Creates a form service.
    #[must_use]
    pub fn new(
        forms: Arc<dyn FormRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        usage: UsageService,
    ) -> Self {
        Self {
            forms,
            submissions,
            usage,
        }
    }

    /// Creates a form if the caller's plan has room for another.
    pub async fn create_form(&self, actor: &AccountIdentity, input: FormInput) -> AppResult<Form> {
        let entitlements = self.usage.resolve_limits(actor).await;
        let schema = build_schema(input.fields, input.settings, &entitlements)?;
        let form = Form::new(
            actor.account_id(),
            input.name,
            input.description,
            schema,
            Utc::now(),
        )?;

        match self
            .forms
            .create_form_within_limit(&form, entitlements.max_forms())
            .await?
        {
            FormInsertOutcome::Created => {}
            FormInsertOutcome::LimitReached { existing } => {
                info!(
                    account_id = %actor.account_id(),
                    existing,
                    "form creation refused at plan limit"
                );
                let limit = entitlements.max_forms().as_option().unwrap_or(u32::MAX);
                return Err(AppError::QuotaExceeded(form_limit_message(limit)));
            }
        }

        info!(account_id = %actor.account_id(), form_id = %form.id(), "form created");
        Ok(form)
    }

    /// Replaces the name, description, fields and settings of an owned form.
    pub async fn update_form(
        &self,
        actor: &AccountIdentity,
        form_id: FormId,
        input: FormInput,
    ) -> AppResult<Form> {
        let mut form = self.owned_form(actor, form_id).await?;
        let entitlements = self.usage.resolve_limits(actor).await;
        let schema = build_schema(input.fields, input.settings, &entitlements)?;

        form.revise(input.name, input.description, schema, Utc::now())?;
        self.forms.update_form(&form).await?;
        Ok(form)
    }

    /// Opens or closes an owned form for submissions.
    pub async fn set_form_active(
        &self,
        actor: &AccountIdentity,
        form_id: FormId,
        is_active: bool,
    ) -> AppResult<Form> {
        let mut form = self.owned_form(actor, form_id).await?;
        form.set_active(is_active, Utc::now());
        self.forms.update_form(&form).await?;

        info!(form_id = %form_id, is_active, "form availability changed");
        Ok(form)
    }

    /// Loads an owned form with this month's submission count.
    pub async fn get_form(&self, actor: &AccountIdentity, form_id: FormId) -> AppResult<FormDetail> {
        let form = self.owned_form(actor, form_id).await?;
        let submissions_this_period = self
            .submissions
            .count_form_submissions_since(form_id, billing_period_start(Utc::now()))
            .await?;

        Ok(FormDetail {
            form,
            submissions_this_period,
        })
    }

    /// Lists the caller's forms, newest first.
    pub async fn list_forms(&self, actor: &AccountIdentity) -> AppResult<Vec<FormSummary>> {
        self.forms.list_forms_for_owner(actor.account_id()).await
    }

    /// Deletes an owned form together with its submissions.
    pub async fn delete_form(&self, actor: &AccountIdentity, form_id: FormId) -> AppResult<()> {
        if !self.forms.delete_form(actor.account_id(), form_id).await? {
            return Err(form_not_found(form_id));
        }

        info!(account_id = %actor.account_id(), form_id = %form_id, "form deleted");
        Ok(())
    }

    /// Lists submissions of an owned form, newest first.
    pub async fn list_submissions(
        &self,
        actor: &AccountIdentity,
        form_id: FormId,
    ) -> AppResult<(Form, Vec<Submission>)> {
        let form = self.owned_form(actor, form_id).await?;
        let submissions = self.submissions.list_submissions(form_id).await?;
        Ok((form, submissions))
    }

    /// Renders every submission of an owned form as CSV.
    pub async fn export_submissions_csv(
        &self,
        actor: &AccountIdentity,
        form_id: FormId,
    ) -> AppResult<SubmissionExport> {
        let (form, submissions) = self.list_submissions(actor, form_id).await?;

        Ok(SubmissionExport {
            file_name: export_file_name(form.name(), Utc::now()),
            csv: render_submissions_csv(&form, &submissions),
        })
    }

    /// Loads a form for anonymous rendering, whether or not it is active.
    pub async fn get_public_form(&self, form_id: FormId) -> AppResult<Form> {
        self.forms
            .find_form(form_id)
            .await?
            .ok_or_else(|| form_not_found(form_id))
    }

    async fn owned_form(&self, actor: &AccountIdentity, form_id: FormId) -> AppResult<Form> {
        self.forms
            .find_form(form_id)
            .await?
            .filter(|form| form.is_owned_by(actor.account_id()))
            .ok_or_else(|| form_not_found(form_id))
    }
}

fn build_schema(
    fields: Vec<FormFieldInput>,
    settings: FormSettingsInput,
    entitlements: &EntitlementSnapshot,
) -> AppResult<FormSchema> {
    let fields = fields
        .into_iter()
        .map(FormField::try_from)
        .collect::<AppResult<Vec<_>>>()?;
    let settings = FormSettings::try_from(settings)?;

    if settings.notify_email().is_some() && !entitlements.email_notifications_allowed() {
        return Err(AppError::Forbidden(
            "email notifications require the Pro plan".to_owned(),
        ));
    }

    FormSchema::new(fields, settings)
}

fn form_not_found(form_id: FormId) -> AppError {
    AppError::NotFound(format!("form '{form_id}' not found"))
}
