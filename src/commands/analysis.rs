// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month analysis through an OpenAI-compatible chat completion endpoint.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::commands::{arg, months};
use crate::config::AiConfig;
use crate::db::SqliteStore;
use crate::error::{self, Error};
use crate::ledger::summary::{MonthSummary, compute_month_summary};
use crate::models::{MonthKey, TransactionKind};
use crate::store::MonthStore;
use crate::utils::{fmt_brl, http_client, parse_month};

const SYSTEM_PROMPT: &str = "Você é um consultor financeiro para freelancers no Brasil. \
Sua resposta deve ser concisa, em português, com 3 a 4 tópicos (bullet points usando *), \
e incluir uma dica prática. Use um tom amigável e profissional.";

pub const FALLBACK_ANSWER: &str = "Não foi possível obter uma análise.";

pub fn handle(store: &SqliteStore, user: &str, ai: &AiConfig, m: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(arg(m, "month")?)?;
    let text = analyze_month(store, user, ai, month)?;
    println!("{}", text);
    Ok(())
}

/// User prompt describing one month with realized figures only.
pub fn build_prompt(summary: &MonthSummary, income_count: usize, expense_count: usize) -> String {
    format!(
        "Analise os seguintes dados financeiros de um freelancer para este mês:\n\
         - Saldo Inicial: {}\n\
         - Total de Entradas Realizadas: {} ({} transações)\n\
         - Total de Saídas Realizadas: {} ({} transações)\n\
         - Saldo Final Real: {}\n\n\
         Com base nisso, forneça uma análise e dicas.",
        fmt_brl(summary.opening_balance),
        fmt_brl(summary.total_income_actual),
        income_count,
        fmt_brl(summary.total_expense_actual),
        expense_count,
        fmt_brl(summary.final_cash_actual),
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

pub fn analyze_month<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    ai: &AiConfig,
    month: MonthKey,
) -> error::Result<String> {
    let bucket = months::load_month(store, user, month)?;
    let summary = compute_month_summary(&bucket);
    let prompt = build_prompt(
        &summary,
        bucket.list(TransactionKind::Income).len(),
        bucket.list(TransactionKind::Expense).len(),
    );
    request_analysis(ai, &prompt)
}

/// Sends `prompt` and returns the first choice's text.
pub fn request_analysis(ai: &AiConfig, prompt: &str) -> error::Result<String> {
    let key = ai
        .api_key
        .as_deref()
        .ok_or_else(|| Error::Config("GROQ_API_KEY is not set".into()))?;
    let client = http_client().map_err(|e| Error::Config(e.to_string()))?;
    let body = ChatRequest {
        model: &ai.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
    };
    debug!(endpoint = %ai.endpoint, model = %ai.model, "requesting analysis");
    let resp = client.post(&ai.endpoint).bearer_auth(key).json(&body).send()?;
    let status = resp.status();
    if !status.is_success() {
        let detail = resp.text().unwrap_or_default();
        warn!(%status, "analysis request rejected");
        return Err(Error::Advisor(format!("HTTP {}: {}", status, detail.trim())));
    }
    let parsed: ChatResponse = resp.json()?;
    Ok(first_answer(parsed))
}

fn first_answer(resp: ChatResponse) -> String {
    resp.choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ANSWER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthBucket;
    use rust_decimal_macros::dec;

    #[test]
    fn prompt_lists_realized_figures_in_brl() {
        let bucket = MonthBucket {
            opening_balance: dec!(1000),
            ..Default::default()
        };
        let mut summary = compute_month_summary(&bucket);
        summary.total_income_actual = dec!(2500.5);
        summary.final_cash_actual = dec!(3500.5);
        let p = build_prompt(&summary, 3, 0);
        assert!(p.contains("Saldo Inicial: R$ 1.000,00"));
        assert!(p.contains("Entradas Realizadas: R$ 2.500,50 (3 transações)"));
        assert!(p.contains("Saídas Realizadas: R$ 0,00 (0 transações)"));
        assert!(p.contains("Saldo Final Real: R$ 3.500,50"));
    }

    #[test]
    fn empty_choices_fall_back() {
        let resp: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(first_answer(resp), FALLBACK_ANSWER);
        let resp: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"* ok"}}]}"#)
                .unwrap();
        assert_eq!(first_answer(resp), "* ok");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let ai = AiConfig {
            api_key: None,
            endpoint: "http://127.0.0.1:9".into(),
            model: "m".into(),
        };
        assert!(matches!(request_analysis(&ai, "x"), Err(Error::Config(_))));
    }
}
