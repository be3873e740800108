use super::domain::{
    CompanyId, CompanyRecord, DiagnosticStage, ScheduleScope, ScheduledSolutionRecord, SolutionId,
    SolutionModality, SolutionOrigin, SolutionRecord,
};
use super::normalizer::{normalize_label, split_list};
use super::{LoaderError, RadarTable};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::io::Read;
use tracing::warn;

pub(crate) fn parse_companies<R: Read>(reader: R) -> Result<Vec<CompanyRecord>, LoaderError> {
    let table = RadarTable::Companies;
    let mut seen = HashSet::new();
    let mut companies = Vec::new();

    for (line, row) in read_rows::<CompanyRow, R>(reader, table)? {
        let name = row.name.trim().to_string();
        if name.is_empty() {
            return Err(invalid(table, line, "missing company name"));
        }

        let id = CompanyId::from_raw(row.id.as_deref().unwrap_or(&name));
        let stage = row.stage.as_deref().and_then(|raw| {
            let stage = DiagnosticStage::parse(raw);
            if stage.is_none() {
                warn!(line, raw, "unknown diagnostic stage, treating as unspecified");
            }
            stage
        });

        if !seen.insert(id.clone()) {
            warn!(%id, line, "duplicate company row ignored");
            continue;
        }

        companies.push(CompanyRecord {
            id,
            name,
            city: row.city.trim().to_string(),
            regional: row.regional.trim().to_string(),
            sector: row.sector.trim().to_string(),
            challenges: split_list(&row.challenges),
            specific_need: row.specific_need.trim().to_string(),
            maturity: row.maturity.trim().to_string(),
            stage,
        });
    }

    Ok(companies)
}

pub(crate) fn parse_solutions<R: Read>(reader: R) -> Result<Vec<SolutionRecord>, LoaderError> {
    let table = RadarTable::Solutions;
    let mut seen = HashSet::new();
    let mut solutions = Vec::new();

    for (line, row) in read_rows::<SolutionRow, R>(reader, table)? {
        let title = row.title.trim().to_string();
        if title.is_empty() {
            return Err(invalid(table, line, "missing solution title"));
        }

        let id = SolutionId::from_raw(row.id.as_deref().unwrap_or(&title));
        let target_stages = parse_stages(&row.stages, line);

        if !seen.insert(id.clone()) {
            warn!(%id, line, "duplicate solution row ignored");
            continue;
        }

        solutions.push(SolutionRecord {
            id,
            title,
            modality: SolutionModality::parse(&row.modality),
            description: row.description.trim().to_string(),
            tags: merge_tags(&row.theme, &row.keywords),
            target_stages,
            target_sectors: split_list(&row.sectors),
            regionals: split_list(&row.regionals),
            origin: SolutionOrigin::Catalog,
        });
    }

    Ok(solutions)
}

pub(crate) fn parse_scheduled<R: Read>(
    reader: R,
) -> Result<Vec<ScheduledSolutionRecord>, LoaderError> {
    let table = RadarTable::Scheduled;
    let mut scheduled = Vec::new();

    for (line, row) in read_rows::<ScheduledRow, R>(reader, table)? {
        let title = row.title.trim().to_string();
        let solution_id = match (row.solution_id.as_deref(), title.is_empty()) {
            (Some(raw), _) => SolutionId::from_raw(raw),
            (None, false) => SolutionId::from_raw(&title),
            (None, true) => return Err(invalid(table, line, "missing solution id and title")),
        };

        let scope = match (row.company.as_deref(), row.regional.as_deref()) {
            (Some(company), _) => ScheduleScope::Company(CompanyId::from_raw(company)),
            (None, Some(regional)) => ScheduleScope::Regional(regional.trim().to_string()),
            (None, None) => return Err(invalid(table, line, "missing company or regional")),
        };

        let planned_for = match row.planned_for.as_deref() {
            Some(raw) => Some(
                parse_date(raw)
                    .ok_or_else(|| invalid(table, line, format!("invalid date '{raw}'")))?,
            ),
            None => None,
        };

        scheduled.push(ScheduledSolutionRecord {
            solution_id,
            scope,
            title,
            modality: SolutionModality::parse(&row.modality),
            theme: row.theme.trim().to_string(),
            city: row.city.trim().to_string(),
            planned_for,
            consultant: row.consultant.map(|value| value.trim().to_string()),
        });
    }

    Ok(scheduled)
}

fn read_rows<T, R>(reader: R, table: RadarTable) -> Result<Vec<(usize, T)>, LoaderError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<T>().enumerate() {
        let row = record.map_err(|source| LoaderError::Csv { table, source })?;
        rows.push((index + 2, row));
    }

    Ok(rows)
}

fn invalid(table: RadarTable, line: usize, reason: impl Into<String>) -> LoaderError {
    LoaderError::InvalidRow {
        table,
        line,
        reason: reason.into(),
    }
}

fn parse_stages(raw: &str, line: usize) -> Vec<DiagnosticStage> {
    let mut stages = Vec::new();
    for entry in split_list(raw) {
        match DiagnosticStage::parse(&entry) {
            Some(stage) if !stages.contains(&stage) => stages.push(stage),
            Some(_) => {}
            None => warn!(line, raw = %entry, "unknown target stage skipped"),
        }
    }
    stages
}

fn merge_tags(theme: &str, keywords: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    split_list(theme)
        .into_iter()
        .chain(split_list(keywords))
        .filter(|tag| seen.insert(normalize_label(tag)))
        .collect()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, Deserialize)]
struct CompanyRow {
    #[serde(rename = "ID", alias = "Id", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Nome da empresa", alias = "Nome Empresa")]
    name: String,
    #[serde(rename = "Cidade", alias = "Município", default)]
    city: String,
    #[serde(rename = "Regional", alias = "Escritório Regional", default)]
    regional: String,
    #[serde(rename = "Setor", default)]
    sector: String,
    #[serde(rename = "Desafio priorizado", alias = "Categoria do Problema", default)]
    challenges: String,
    #[serde(
        rename = "Necessidade específica",
        alias = "Descrição do Problema",
        default
    )]
    specific_need: String,
    #[serde(
        rename = "Maturidade em inovação",
        alias = "Média diagnóstico inicial",
        default
    )]
    maturity: String,
    #[serde(
        rename = "Estágio do diagnóstico",
        alias = "Encontro",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    stage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SolutionRow {
    #[serde(rename = "ID", alias = "Id", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Nome da solução", alias = "Ação Destaque")]
    title: String,
    #[serde(rename = "Modalidade", alias = "Instrumento", default)]
    modality: String,
    #[serde(rename = "Descrição", alias = "Objetivo", default)]
    description: String,
    #[serde(rename = "Tema", alias = "Estratégia", default)]
    theme: String,
    #[serde(rename = "Palavras-chave", alias = "Tags", default)]
    keywords: String,
    #[serde(rename = "Estágios", alias = "Estágio do diagnóstico", default)]
    stages: String,
    #[serde(rename = "Setor", alias = "Público-alvo", alias = "Público Alvo", default)]
    sectors: String,
    #[serde(rename = "Regional", default)]
    regionals: String,
}

#[derive(Debug, Deserialize)]
struct ScheduledRow {
    #[serde(
        rename = "ID da solução",
        alias = "ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    solution_id: Option<String>,
    #[serde(rename = "Nome da solução", alias = "Ação Destaque", default)]
    title: String,
    #[serde(rename = "Modalidade", alias = "Instrumento", default)]
    modality: String,
    #[serde(rename = "Tema", alias = "Estratégia", default)]
    theme: String,
    #[serde(rename = "Regional", default, deserialize_with = "empty_string_as_none")]
    regional: Option<String>,
    #[serde(
        rename = "Empresa",
        alias = "ID da empresa",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    company: Option<String>,
    #[serde(rename = "Cidade", default)]
    city: String,
    #[serde(
        rename = "Data prevista",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    planned_for: Option<String>,
    #[serde(
        rename = "Consultor responsável",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    consultant: Option<String>,
}
