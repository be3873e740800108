use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ScoringConfig;
use crate::radar::domain::{
    CompanyId, CompanyRecord, DiagnosticStage, RadarSnapshot, ScheduleScope,
    ScheduledSolutionRecord, SolutionId, SolutionModality, SolutionOrigin, SolutionRecord,
};
use crate::recommendation::llm::{LanguageModel, LlmError, Prompt};
use crate::recommendation::orchestrator::RecommendationOrchestrator;
use crate::recommendation::scoring::ScoringEngine;

pub(super) fn company(name: &str, regional: &str, challenges: &[&str]) -> CompanyRecord {
    CompanyRecord {
        id: CompanyId::from_raw(name),
        name: name.to_string(),
        city: "Belo Horizonte".to_string(),
        regional: regional.to_string(),
        sector: "Comércio".to_string(),
        challenges: challenges.iter().map(|c| c.to_string()).collect(),
        specific_need: String::new(),
        maturity: "Baixa".to_string(),
        stage: Some(DiagnosticStage::Nomear),
    }
}

pub(super) fn solution(title: &str, tags: &[&str]) -> SolutionRecord {
    SolutionRecord {
        id: SolutionId::from_raw(title),
        title: title.to_string(),
        modality: SolutionModality::Curso,
        description: String::new(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        target_stages: Vec::new(),
        target_sectors: Vec::new(),
        regionals: Vec::new(),
        origin: SolutionOrigin::Catalog,
    }
}

/// Solution A and B from the marketing / financeiro walkthrough.
pub(super) fn marketing_and_finance() -> Vec<SolutionRecord> {
    vec![
        solution("Workshop de Marketing Digital", &["marketing", "digital", "vendas"]),
        solution("Gestão Financeira", &["financeiro", "gestão"]),
    ]
}

pub(super) fn scheduled(title: &str, scope: ScheduleScope) -> ScheduledSolutionRecord {
    ScheduledSolutionRecord {
        solution_id: SolutionId::from_raw(title),
        scope,
        title: title.to_string(),
        modality: SolutionModality::Curso,
        theme: String::new(),
        city: String::new(),
        planned_for: None,
        consultant: None,
    }
}

pub(super) fn snapshot(
    companies: Vec<CompanyRecord>,
    solutions: Vec<SolutionRecord>,
    scheduled: Vec<ScheduledSolutionRecord>,
) -> RadarSnapshot {
    RadarSnapshot {
        companies,
        solutions,
        scheduled,
        loaded_at: Utc::now(),
    }
}

pub(super) fn engine(top_n: usize) -> ScoringEngine {
    ScoringEngine::new(ScoringConfig { top_n })
}

pub(super) fn orchestrator(model: Arc<dyn LanguageModel>) -> RecommendationOrchestrator {
    RecommendationOrchestrator::new(engine(5), model, Duration::from_millis(200))
}

/// Replies with fixed text and counts calls.
#[derive(Default)]
pub(super) struct ScriptedModel {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub(super) fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Answers long after the orchestrator's timeout.
pub(super) struct SlowModel;

#[async_trait]
impl LanguageModel for SlowModel {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, LlmError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("1. [gestao-financeira] Gestão Financeira: tarde demais".to_string())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Fails like an upstream outage.
pub(super) struct BrokenModel;

#[async_trait]
impl LanguageModel for BrokenModel {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, LlmError> {
        Err(LlmError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }

    fn name(&self) -> &str {
        "broken"
    }
}
