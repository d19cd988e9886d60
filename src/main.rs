//! Smoke binary: mounts the flow against the configured backend, opens
//! the modal, and prints the resulting step walk.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use intake_flow::adapters::http::{
    BackendClient, HttpAnalyticsSink, HttpAuthApi, HttpPaymentApi, HttpQuestionnaireSource,
    HttpSequenceTriggerApi,
};
use intake_flow::application::{FlowOrchestrator, FlowPorts};
use intake_flow::config::AppConfig;
use intake_flow::domain::flow::{FlowEvent, ProductContext};
use intake_flow::domain::foundation::ProductId;
use intake_flow::ports::SystemClock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;
    config.validate()?;
    tracing::info!(base_url = %config.api.base_url, "starting intake flow");

    let product_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo-product".to_string());
    let product = ProductContext {
        product_id: ProductId::new(product_id)?,
        form_id: None,
        clinic_id: None,
        clinic_merchant_of_record: false,
        product_name: "Demo Product".to_string(),
        flat_price_cents: Some(9_900),
        tiered_plans: Vec::new(),
    };

    let client = Arc::new(BackendClient::new(config.api.clone())?);
    let ports = FlowPorts {
        auth: Arc::new(HttpAuthApi::new(Arc::clone(&client))),
        payments: Arc::new(HttpPaymentApi::new(Arc::clone(&client))),
        analytics: Arc::new(HttpAnalyticsSink::new(Arc::clone(&client))),
        questionnaires: Arc::new(HttpQuestionnaireSource::new(Arc::clone(&client))),
        sequences: Arc::new(HttpSequenceTriggerApi::new(Arc::clone(&client))),
        clock: Arc::new(SystemClock),
    };

    let flow = FlowOrchestrator::new(product, &config, ports);
    flow.dispatch(FlowEvent::ModalOpened {
        page_url: "http://localhost/intake".to_string(),
    })
    .await;

    flow.with_state(|state| match state.questionnaire.as_ref() {
        Some(questionnaire) => {
            let authenticated = state.authenticated();
            let total =
                state
                    .sequencer
                    .total_visible_steps(questionnaire, &state.answers, authenticated);
            println!("questionnaire loaded: {} visible steps", total);
            let mut index = 0;
            while let Some(step) = state.sequencer.visible_step_at(
                index,
                questionnaire,
                &state.answers,
                authenticated,
            ) {
                println!("  step: {}", step.title);
                index = questionnaire
                    .steps
                    .iter()
                    .position(|s| s.id == step.id)
                    .map(|i| i + 1)
                    .unwrap_or(questionnaire.steps.len());
            }
            println!("  step: checkout ({} plans)", state.plans.len());
        }
        None => println!(
            "questionnaire unavailable: {}",
            state.load_error.as_deref().unwrap_or("no error recorded")
        ),
    })
    .await;

    Ok(())
}
