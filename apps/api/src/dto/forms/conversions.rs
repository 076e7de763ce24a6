use formwell_application::{FormDetail, FormInput, FormSummary};
use formwell_core::AppError;
use formwell_domain::{
    Form, FormField, FormFieldInput, FormSettings, FormSettingsInput, FormTheme,
};

use super::types::{
    FormDetailResponse, FormFieldRequest, FormFieldResponse, FormListItemResponse, FormRequest,
    FormResponse, FormSettingsRequest, FormSettingsResponse, PublicFormResponse,
};

impl TryFrom<FormFieldRequest> for FormFieldInput {
    type Error = AppError;

    fn try_from(value: FormFieldRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            field_type: value.field_type.parse()?,
            label: value.label,
            placeholder: value.placeholder,
            required: value.required,
            options: value.options,
        })
    }
}

impl TryFrom<FormSettingsRequest> for FormSettingsInput {
    type Error = AppError;

    fn try_from(value: FormSettingsRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            submit_button_text: value.submit_button_text.unwrap_or_default(),
            success_message: value.success_message.unwrap_or_default(),
            theme: value
                .theme
                .as_deref()
                .map(str::parse::<FormTheme>)
                .transpose()?
                .unwrap_or_default(),
            button_color: value.button_color.unwrap_or_default(),
            notify_email: value.notify_email,
        })
    }
}

impl TryFrom<FormRequest> for FormInput {
    type Error = AppError;

    fn try_from(value: FormRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            description: value.description,
            fields: value
                .fields
                .into_iter()
                .map(FormFieldInput::try_from)
                .collect::<Result<_, _>>()?,
            settings: value
                .settings
                .map(FormSettingsInput::try_from)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl From<&FormField> for FormFieldResponse {
    fn from(field: &FormField) -> Self {
        Self {
            id: field.id().to_owned(),
            field_type: field.field_type().as_str().to_owned(),
            label: field.label().to_owned(),
            placeholder: field.placeholder().map(ToOwned::to_owned),
            required: field.is_required(),
            options: field.options().to_vec(),
        }
    }
}

impl From<&FormSettings> for FormSettingsResponse {
    fn from(settings: &FormSettings) -> Self {
        Self {
            submit_button_text: settings.submit_button_text().to_owned(),
            success_message: settings.success_message().to_owned(),
            theme: settings.theme().as_str().to_owned(),
            button_color: settings.button_color().to_owned(),
            notify_email: settings
                .notify_email()
                .map(|email| email.as_str().to_owned()),
        }
    }
}

impl From<Form> for FormResponse {
    fn from(form: Form) -> Self {
        Self {
            id: form.id().to_string(),
            name: form.name().to_owned(),
            description: form.description().map(ToOwned::to_owned),
            is_active: form.is_active(),
            fields: form.fields().iter().map(FormFieldResponse::from).collect(),
            settings: FormSettingsResponse::from(form.settings()),
            created_at: form.created_at().to_rfc3339(),
            updated_at: form.updated_at().to_rfc3339(),
        }
    }
}

impl From<FormDetail> for FormDetailResponse {
    fn from(detail: FormDetail) -> Self {
        Self {
            form: FormResponse::from(detail.form),
            submissions_this_period: detail.submissions_this_period,
        }
    }
}

impl From<FormSummary> for FormListItemResponse {
    fn from(summary: FormSummary) -> Self {
        let form = summary.form;
        Self {
            id: form.id().to_string(),
            name: form.name().to_owned(),
            description: form.description().map(ToOwned::to_owned),
            is_active: form.is_active(),
            submission_count: summary.submission_count,
            created_at: form.created_at().to_rfc3339(),
            updated_at: form.updated_at().to_rfc3339(),
        }
    }
}

impl From<Form> for PublicFormResponse {
    fn from(form: Form) -> Self {
        let settings = form.settings();
        Self {
            id: form.id().to_string(),
            name: form.name().to_owned(),
            description: form.description().map(ToOwned::to_owned),
            is_active: form.is_active(),
            fields: form.fields().iter().map(FormFieldResponse::from).collect(),
            submit_button_text: settings.submit_button_text().to_owned(),
            theme: settings.theme().as_str().to_owned(),
            button_color: settings.button_color().to_owned(),
        }
    }
}
