use serde::Serialize;

use super::scoring::{company_terms, recall, solution_terms};
use crate::radar::domain::{CompanyId, CompanyRecord, ScheduledIndex, SolutionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdherenceLevel {
    Alta,
    #[serde(rename = "Média")]
    Media,
    Baixa,
}

impl AdherenceLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            8.. => Self::Alta,
            4..=7 => Self::Media,
            _ => Self::Baixa,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Alta => "Alta",
            Self::Media => "Média",
            Self::Baixa => "Baixa",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyAdherence {
    pub company_id: CompanyId,
    pub company_name: String,
    /// 0..=10
    pub score: u8,
    pub level: AdherenceLevel,
    pub matched_terms: Vec<String>,
    pub justification: String,
}

/// Rate how well `solution` fits each company. Companies already scheduled for it are skipped.
pub fn analyze(
    solution: &SolutionRecord,
    companies: &[&CompanyRecord],
    scheduled: &ScheduledIndex,
) -> Vec<CompanyAdherence> {
    let offered = solution_terms(solution);

    let mut results: Vec<CompanyAdherence> = companies
        .iter()
        .filter(|company| !scheduled.is_scheduled(company, &solution.id))
        .map(|company| {
            if !solution.accepts_stage(company.stage) {
                let stage = company.stage.map_or("não informado", |stage| stage.label());
                return CompanyAdherence {
                    company_id: company.id.clone(),
                    company_name: company.name.clone(),
                    score: 0,
                    level: AdherenceLevel::Baixa,
                    matched_terms: Vec::new(),
                    justification: format!("Estágio {stage} fora do público da solução."),
                };
            }

            let (matched_terms, ratio) = recall(&company_terms(company), &offered);
            let score = (ratio * 10.0).round().clamp(0.0, 10.0) as u8;
            let justification = if matched_terms.is_empty() {
                "Nenhum desafio da empresa é atendido pela solução.".to_string()
            } else {
                format!("Atende aos desafios: {}.", matched_terms.join(", "))
            };

            CompanyAdherence {
                company_id: company.id.clone(),
                company_name: company.name.clone(),
                score,
                level: AdherenceLevel::from_score(score),
                matched_terms,
                justification,
            }
        })
        .collect();

    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}
