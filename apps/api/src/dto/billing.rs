use formwell_application::{BillingProduct, PricingOverview};
use serde::Serialize;
use ts_rs::TS;

/// One purchasable plan.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/billing-product-response.ts"
)]
pub struct BillingProductResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Price in the currency's minor unit.
    #[ts(type = "number | null")]
    pub unit_amount: Option<i64>,
    pub currency: Option<String>,
    pub interval: Option<String>,
}

/// Pricing page payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/pricing-response.ts"
)]
pub struct PricingResponse {
    pub products: Vec<BillingProductResponse>,
    pub current_product_id: Option<String>,
}

impl From<BillingProduct> for BillingProductResponse {
    fn from(product: BillingProduct) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            unit_amount: product.unit_amount,
            currency: product.currency,
            interval: product.interval,
        }
    }
}

impl From<PricingOverview> for PricingResponse {
    fn from(overview: PricingOverview) -> Self {
        Self {
            products: overview
                .products
                .into_iter()
                .map(BillingProductResponse::from)
                .collect(),
            current_product_id: overview.current_product_id,
        }
    }
}
