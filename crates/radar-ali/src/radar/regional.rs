use serde::Serialize;
use std::collections::HashMap;

use super::domain::{CompanyRecord, RadarSnapshot};
use super::normalizer::normalize_label;

const ALL_REGIONALS: &str = "todas";
const UNSPECIFIED: &str = "Não informado";

/// Whether a regional filter selects every company.
pub fn is_all_regionals(regional: Option<&str>) -> bool {
    match regional {
        None => true,
        Some(raw) => {
            let key = normalize_label(raw);
            key.is_empty() || key == ALL_REGIONALS
        }
    }
}

/// Companies of one regional, or all of them for `None` / `Todas`.
pub fn filter_companies<'a>(
    companies: &'a [CompanyRecord],
    regional: Option<&str>,
) -> Vec<&'a CompanyRecord> {
    match regional.filter(|raw| !is_all_regionals(Some(*raw))) {
        None => companies.iter().collect(),
        Some(regional) => companies
            .iter()
            .filter(|company| company.in_regional(regional))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Dashboard metrics for a regional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalSummary {
    /// `None` when the summary spans every regional.
    pub regional: Option<String>,
    pub total_companies: usize,
    pub scheduled_solutions: usize,
    pub unique_challenges: usize,
    pub unique_sectors: usize,
    pub challenges: Vec<LabelCount>,
    pub sectors: Vec<LabelCount>,
    pub maturity: Vec<LabelCount>,
    pub stages: Vec<LabelCount>,
}

impl RegionalSummary {
    pub fn build(snapshot: &RadarSnapshot, regional: Option<&str>) -> Self {
        let regional = regional
            .filter(|raw| !is_all_regionals(Some(*raw)))
            .map(|raw| raw.trim().to_string());
        let companies = filter_companies(&snapshot.companies, regional.as_deref());

        let mut challenges = Tally::default();
        let mut sectors = Tally::default();
        let mut maturity = Tally::default();
        let mut stages = Tally::default();

        for company in &companies {
            for challenge in &company.challenges {
                challenges.add(challenge);
            }
            if !company.sector.is_empty() {
                sectors.add(&company.sector);
            }
            maturity.add(non_empty_or_unspecified(&company.maturity));
            stages.add(company.stage.map_or(UNSPECIFIED, |stage| stage.label()));
        }

        Self {
            total_companies: companies.len(),
            scheduled_solutions: snapshot.scheduled_in(regional.as_deref()).count(),
            unique_challenges: challenges.len(),
            unique_sectors: sectors.len(),
            challenges: challenges.into_sorted(),
            sectors: sectors.into_sorted(),
            maturity: maturity.into_sorted(),
            stages: stages.into_sorted(),
            regional,
        }
    }

    pub fn top_challenge(&self) -> Option<&LabelCount> {
        self.challenges.first()
    }

    pub fn top_sector(&self) -> Option<&LabelCount> {
        self.sectors.first()
    }
}

fn non_empty_or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        UNSPECIFIED
    } else {
        value
    }
}

/// Counts labels by normalized key, reporting the first spelling seen.
#[derive(Default)]
struct Tally {
    counts: HashMap<String, LabelCount>,
}

impl Tally {
    fn add(&mut self, label: &str) {
        let key = normalize_label(label);
        if key.is_empty() {
            return;
        }
        self.counts
            .entry(key)
            .or_insert_with(|| LabelCount {
                label: label.trim().to_string(),
                count: 0,
            })
            .count += 1;
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn into_sorted(self) -> Vec<LabelCount> {
        let mut entries: Vec<LabelCount> = self.counts.into_values().collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::domain::{CompanyId, DiagnosticStage};
    use chrono::Utc;

    fn company(name: &str, regional: &str, sector: &str, challenges: &[&str]) -> CompanyRecord {
        CompanyRecord {
            id: CompanyId::from_raw(name),
            name: name.to_string(),
            city: String::new(),
            regional: regional.to_string(),
            sector: sector.to_string(),
            challenges: challenges.iter().map(|c| c.to_string()).collect(),
            specific_need: String::new(),
            maturity: "Baixa".to_string(),
            stage: Some(DiagnosticStage::Nomear),
        }
    }

    fn snapshot() -> RadarSnapshot {
        RadarSnapshot {
            companies: vec![
                company("Empresa A", "Central", "Comércio", &["Marketing digital", "Financeiro"]),
                company("Empresa B", "Central", "Serviços", &["financeiro"]),
                company("Empresa C", "Norte", "Comércio", &["Gestão de pessoas"]),
            ],
            solutions: Vec::new(),
            scheduled: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    #[test]
    fn todas_selects_every_company() {
        let snapshot = snapshot();
        assert_eq!(filter_companies(&snapshot.companies, Some("Todas")).len(), 3);
        assert_eq!(filter_companies(&snapshot.companies, None).len(), 3);
        assert_eq!(filter_companies(&snapshot.companies, Some("central")).len(), 2);
    }

    #[test]
    fn summary_orders_counts_descending_then_label() {
        let summary = RegionalSummary::build(&snapshot(), Some("Central"));

        assert_eq!(summary.regional.as_deref(), Some("Central"));
        assert_eq!(summary.total_companies, 2);
        assert_eq!(summary.unique_challenges, 2);
        assert_eq!(
            summary.challenges,
            vec![
                LabelCount {
                    label: "Financeiro".to_string(),
                    count: 2
                },
                LabelCount {
                    label: "Marketing digital".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(summary.sectors[0].label, "Comércio");
        assert_eq!(summary.stages[0].label, "Nomear");
        assert_eq!(summary.stages[0].count, 2);
    }

    #[test]
    fn summary_for_all_regionals_has_no_label() {
        let summary = RegionalSummary::build(&snapshot(), Some("TODAS"));
        assert!(summary.regional.is_none());
        assert_eq!(summary.total_companies, 3);
        assert_eq!(summary.top_sector().map(|entry| entry.count), Some(2));
    }
}
