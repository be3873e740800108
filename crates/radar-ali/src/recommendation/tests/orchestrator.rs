use super::common::*;
use std::sync::Arc;

use crate::radar::domain::{CompanyRecord, RadarSnapshot, ScheduleScope, SolutionOrigin};
use crate::radar::regional::RegionalSummary;
use crate::recommendation::curation::{detect_gaps, CurationConfig};
use crate::recommendation::llm::{DisabledModel, LlmError};
use crate::recommendation::orchestrator::{
    FallbackReason, RecommendationOutcome, SelectionSource, NO_CANDIDATES_MESSAGE,
};

fn setup() -> (CompanyRecord, RadarSnapshot) {
    let company = company("Empresa A", "Central", &["marketing digital", "financeiro"]);
    let snapshot = snapshot(vec![company.clone()], marketing_and_finance(), Vec::new());
    (company, snapshot)
}

#[tokio::test]
async fn valid_model_picks_are_accepted_in_model_order() {
    let (company, snapshot) = setup();
    let model = ScriptedModel::replying(
        "1. [gestao-financeira] Gestão Financeira: organiza o caixa da empresa.\n\
2. [workshop-de-marketing-digital] Workshop de Marketing Digital: presença online.",
    );
    let orchestrator = orchestrator(model.clone());

    let outcome = orchestrator
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;

    assert_eq!(outcome.source(), Some(SelectionSource::Model));
    assert_eq!(outcome.fallback_reason(), None);
    let titles: Vec<&str> = outcome
        .selections()
        .iter()
        .map(|selection| selection.solution.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Gestão Financeira", "Workshop de Marketing Digital"]);
    assert_eq!(
        outcome.selections()[0].justification,
        "organiza o caixa da empresa."
    );
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn picks_resolve_by_normalized_title() {
    let (company, snapshot) = setup();
    let model = ScriptedModel::replying("1. GESTAO FINANCEIRA: controle de custos");

    let outcome = orchestrator(model)
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;

    assert_eq!(outcome.source(), Some(SelectionSource::Model));
    assert_eq!(outcome.selections()[0].solution.title, "Gestão Financeira");
}

#[tokio::test]
async fn mangled_id_resolves_through_the_written_title() {
    let (company, snapshot) = setup();
    let model = ScriptedModel::replying("1. [sol-financeira] Gestão Financeira: controle de custos");

    let outcome = orchestrator(model)
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;

    assert_eq!(outcome.source(), Some(SelectionSource::Model));
    assert_eq!(outcome.selections()[0].solution.title, "Gestão Financeira");
}

#[tokio::test]
async fn hallucinated_pick_falls_back_to_top_candidate() {
    let (company, snapshot) = setup();
    let model = ScriptedModel::replying(
        "1. [workshop-de-marketing-digital] Workshop de Marketing Digital: ótimo.\n\
2. [consultoria-imaginaria] Consultoria Imaginária: não existe no catálogo.",
    );

    let outcome = orchestrator(model)
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;

    assert_eq!(outcome.source(), Some(SelectionSource::Fallback));
    assert_eq!(
        outcome.fallback_reason(),
        Some(FallbackReason::InvalidSelection)
    );
    assert_eq!(outcome.selections().len(), 1);
    let selection = &outcome.selections()[0];
    assert_eq!(selection.solution.title, "Workshop de Marketing Digital");
    assert!(selection.justification.starts_with("Matches challenges:"));
}

#[tokio::test]
async fn scheduled_solution_named_by_model_is_rejected() {
    let company = company("Empresa A", "Central", &["marketing digital", "financeiro"]);
    let snapshot = snapshot(
        vec![company.clone()],
        marketing_and_finance(),
        vec![scheduled(
            "Gestão Financeira",
            ScheduleScope::Regional("Central".to_string()),
        )],
    );
    let model = ScriptedModel::replying("1. [gestao-financeira] Gestão Financeira: já agendada");

    let outcome = orchestrator(model)
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;

    assert_eq!(
        outcome.fallback_reason(),
        Some(FallbackReason::InvalidSelection)
    );
    assert_eq!(
        outcome.selections()[0].solution.title,
        "Workshop de Marketing Digital"
    );
}

#[tokio::test]
async fn unparseable_reply_falls_back() {
    let (company, snapshot) = setup();
    let model = ScriptedModel::replying("Desculpe, não posso ajudar com isso.");

    let outcome = orchestrator(model)
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;

    assert_eq!(outcome.fallback_reason(), Some(FallbackReason::Unparseable));
}

#[tokio::test]
async fn disabled_and_failing_models_fall_back() {
    let (company, snapshot) = setup();

    let disabled = orchestrator(Arc::new(DisabledModel))
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;
    assert_eq!(
        disabled.fallback_reason(),
        Some(FallbackReason::ModelDisabled)
    );

    let broken = orchestrator(Arc::new(BrokenModel))
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;
    assert_eq!(broken.fallback_reason(), Some(FallbackReason::ModelError));
    assert_eq!(
        broken.selections()[0].solution.title,
        "Workshop de Marketing Digital"
    );
}

#[tokio::test]
async fn slow_model_times_out_into_fallback() {
    let (company, snapshot) = setup();

    let outcome = orchestrator(Arc::new(SlowModel))
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;

    assert_eq!(outcome.fallback_reason(), Some(FallbackReason::Timeout));
    match outcome {
        RecommendationOutcome::Recommended { fallback, .. } => {
            let fallback = fallback.expect("fallback recorded");
            assert!(fallback.detail.contains("did not answer"));
        }
        other => panic!("expected recommendation, got {other:?}"),
    }
}

#[tokio::test]
async fn no_candidates_skips_model_and_reports_message() {
    let company = company("Empresa A", "Central", &["marketing"]);
    let snapshot = snapshot(vec![company.clone()], Vec::new(), Vec::new());
    let model = ScriptedModel::replying("1. [inventada] Inventada: nunca deveria aparecer");

    let outcome = orchestrator(model.clone())
        .recommend(&snapshot, &snapshot.solutions, &company)
        .await;

    assert_eq!(
        outcome,
        RecommendationOutcome::NoCandidates {
            company_id: company.id.clone(),
            message: NO_CANDIDATES_MESSAGE.to_string(),
        }
    );
    assert!(outcome.selections().is_empty());
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn registered_solutions_are_candidates_too() {
    let (company, snapshot) = setup();
    let mut registered = solution("Mentoria de Finanças", &["financeiro", "marketing", "digital"]);
    registered.origin = SolutionOrigin::Registered;
    let mut catalog = snapshot.solutions.clone();
    catalog.push(registered);

    let outcome = orchestrator(Arc::new(DisabledModel))
        .recommend(&snapshot, &catalog, &company)
        .await;

    assert_eq!(
        outcome.selections()[0].solution.title,
        "Mentoria de Finanças"
    );
}

#[tokio::test]
async fn suggestions_parse_model_reply_and_surface_errors() {
    let companies = vec![
        company("Empresa A", "Central", &["Exportação"]),
        company("Empresa B", "Central", &["exportação"]),
    ];
    let snapshot = snapshot(companies, Vec::new(), Vec::new());
    let summary = RegionalSummary::build(&snapshot, Some("Central"));
    let refs: Vec<_> = snapshot.companies.iter().collect();
    let gaps = detect_gaps(&refs, &snapshot.solutions, &[], &CurationConfig::default());
    assert_eq!(gaps[0].term, "exportacao");

    let model = ScriptedModel::replying(
        "1. [Rota da Exportação] (Programa): prepara empresas para vender fora.",
    );
    let suggestions = orchestrator(model)
        .suggest_solutions(&summary, &gaps, &[])
        .await
        .expect("suggestions");
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].name, "Rota da Exportação");
    assert_eq!(suggestions[0].modality, "Programa");

    let error = orchestrator(Arc::new(DisabledModel))
        .suggest_solutions(&summary, &gaps, &[])
        .await
        .expect_err("disabled model");
    assert!(matches!(error, LlmError::Disabled));
}
