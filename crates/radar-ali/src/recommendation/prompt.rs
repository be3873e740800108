use std::fmt::Write;

use super::curation::UnderservedArea;
use super::llm::Prompt;
use super::scoring::ScoredSolution;
use crate::radar::domain::{CompanyRecord, ScheduledSolutionRecord};
use crate::radar::regional::{LabelCount, RegionalSummary};

const SYSTEM_PERSONA: &str = "Você é um consultor especializado do Sebrae MG.";

/// Maximum number of picks requested from the model.
pub const MAX_PICKS: usize = 3;
/// Number of new solutions requested by the curation prompt.
pub const SUGGESTION_COUNT: usize = 5;

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        "não informado"
    } else {
        value
    }
}

fn scheduled_lines(out: &mut String, scheduled: &[&ScheduledSolutionRecord]) {
    if scheduled.is_empty() {
        out.push_str("- nenhuma\n");
        return;
    }
    for record in scheduled {
        let planned = record
            .planned_for
            .map(|date| date.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "sem data".to_string());
        let _ = writeln!(
            out,
            "- [{}] {}: {} | {}",
            record.solution_id,
            or_unspecified(&record.title),
            record.modality.label(),
            planned
        );
    }
}

fn count_lines(out: &mut String, entries: &[LabelCount], limit: usize) {
    if entries.is_empty() {
        out.push_str("- sem dados\n");
        return;
    }
    for entry in entries.iter().take(limit) {
        let _ = writeln!(out, "- {}: {} empresas", entry.label, entry.count);
    }
}

/// Prompt asking the model to pick among the ranked candidates.
pub fn recommendation_prompt(
    company: &CompanyRecord,
    candidates: &[ScoredSolution],
    scheduled: &[&ScheduledSolutionRecord],
) -> Prompt {
    let mut user = String::new();
    user.push_str(
        "Você recomenda soluções do Sebrae MG para empresas com base em seus desafios e necessidades.\n\n",
    );

    user.push_str("DADOS DA EMPRESA:\n");
    let _ = writeln!(user, "- Nome: {}", company.name);
    let _ = writeln!(
        user,
        "- Cidade/Regional: {}/{}",
        or_unspecified(&company.city),
        or_unspecified(&company.regional)
    );
    let _ = writeln!(user, "- Setor: {}", or_unspecified(&company.sector));
    let _ = writeln!(
        user,
        "- Desafio priorizado: {}",
        or_unspecified(&company.challenges.join("; "))
    );
    let _ = writeln!(
        user,
        "- Maturidade em inovação: {}",
        or_unspecified(&company.maturity)
    );
    let _ = writeln!(
        user,
        "- Necessidade específica: {}",
        or_unspecified(&company.specific_need)
    );
    let _ = writeln!(
        user,
        "- Estágio do diagnóstico: {}",
        company.stage.map_or("não informado", |stage| stage.label())
    );

    user.push_str("\nSOLUÇÕES CANDIDATAS (use apenas estas):\n");
    for candidate in candidates {
        let solution = &candidate.solution;
        let _ = writeln!(
            user,
            "- [{}] {}: {} | {} | aderência {:.2}",
            solution.id,
            solution.title,
            solution.modality.label(),
            or_unspecified(&solution.tags.join(", ")),
            candidate.score
        );
    }

    user.push_str("\nSOLUÇÕES JÁ AGENDADAS PARA A EMPRESA OU REGIONAL (não recomende):\n");
    scheduled_lines(&mut user, scheduled);

    let _ = write!(
        user,
        "\nTAREFA:\nRecomende até {MAX_PICKS} soluções da lista de candidatas, considerando o desafio \
priorizado, a necessidade específica, o setor e a maturidade da empresa. Não invente soluções fora da lista.\n\n\
FORMATO DA RESPOSTA:\n\
1. [id] Nome da solução: justificativa\n\
2. [id] Nome da solução: justificativa\n"
    );

    Prompt {
        system: SYSTEM_PERSONA.to_string(),
        user,
    }
}

/// Prompt asking the model for new solutions covering a regional's gaps.
pub fn suggestion_prompt(
    summary: &RegionalSummary,
    gaps: &[UnderservedArea],
    scheduled: &[&ScheduledSolutionRecord],
) -> Prompt {
    let mut user = String::new();
    let _ = writeln!(
        user,
        "Você sugere novos cursos e soluções do Sebrae MG para a regional {} com base em dados agregados.\n",
        summary.regional.as_deref().unwrap_or("Todas")
    );

    let _ = writeln!(user, "Empresas diagnosticadas: {}\n", summary.total_companies);
    user.push_str("Desafios mais comuns:\n");
    count_lines(&mut user, &summary.challenges, 5);
    user.push_str("\nSetores mais comuns:\n");
    count_lines(&mut user, &summary.sectors, 5);
    user.push_str("\nDistribuição de maturidade em inovação:\n");
    count_lines(&mut user, &summary.maturity, usize::MAX);

    user.push_str("\nTemas pouco atendidos pelo catálogo:\n");
    if gaps.is_empty() {
        user.push_str("- nenhum\n");
    }
    for gap in gaps {
        let _ = writeln!(
            user,
            "- {}: {} empresas, {} soluções",
            gap.term, gap.company_count, gap.solution_count
        );
    }

    user.push_str("\nSoluções já agendadas:\n");
    scheduled_lines(&mut user, scheduled);

    let _ = write!(
        user,
        "\nTAREFA:\nSugira {SUGGESTION_COUNT} novos cursos ou soluções para esta regional, priorizando os temas \
pouco atendidos e evitando soluções similares às já agendadas. Explique por que cada sugestão beneficia a regional.\n\n\
FORMATO DA RESPOSTA:\n\
1. [Nome da solução] (Curso/Consultoria/Programa): justificativa\n\
2. [Nome da solução] (Curso/Consultoria/Programa): justificativa\n"
    );

    Prompt {
        system: SYSTEM_PERSONA.to_string(),
        user,
    }
}
