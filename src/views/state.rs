// src/views/state.rs

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;

use crate::common::error::AppError;

// A máquina de estados uniforme de toda view de recurso:
// idle -> loading -> {success, error}, disparada na montagem ou quando o
// parâmetro da rota muda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn success(&self) -> Option<&T> {
        match self {
            ViewState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Absorve o resultado de um fetch na máquina de estados.
///
/// HTTP e rede viram estado de erro da própria view (com retry); sessão
/// expirada e cancelamento sobem para o shell, que são irrecuperáveis aqui.
pub fn absorb<T>(state: &mut ViewState<T>, result: Result<T, AppError>) -> Result<(), AppError> {
    match result {
        Ok(value) => {
            *state = ViewState::Success(value);
            Ok(())
        }
        Err(err @ (AppError::AuthExpired { .. } | AppError::Cancelled)) => {
            *state = ViewState::Idle;
            Err(err)
        }
        Err(err) => {
            *state = ViewState::Error(err.user_message());
            Ok(())
        }
    }
}

// --- Formatação compartilhada das views ---

/// Dinheiro com duas casas, como as listas mostram.
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2} €", amount.round_dp(2))
}

/// Data ISO do serviço em formato curto; cai para o valor cru se não der
/// para interpretar, e "N/A" sem data (igual ao comportamento original).
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "N/A".to_string();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%d/%m/%Y %H:%M").to_string();
    }
    raw.to_string()
}

pub fn print_error_with_retry(message: &str) {
    println!("❌ Erro: {}", message);
    println!("   (use 'retry' para tentar de novo)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn success_and_http_error_stay_inside_the_view() {
        let mut state: ViewState<i32> = ViewState::Loading;
        absorb(&mut state, Ok(7)).unwrap();
        assert_eq!(state.success(), Some(&7));

        let mut state: ViewState<i32> = ViewState::Loading;
        absorb(
            &mut state,
            Err(AppError::HttpError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "quebrou".to_string(),
            }),
        )
        .unwrap();
        assert!(state.error().unwrap().contains("quebrou"));
    }

    #[test]
    fn an_expired_session_escapes_to_the_caller() {
        let mut state: ViewState<i32> = ViewState::Loading;
        let err = absorb(
            &mut state,
            Err(AppError::AuthExpired {
                original_status: StatusCode::UNAUTHORIZED,
            }),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::AuthExpired { .. }));
        assert_eq!(state, ViewState::Idle);
    }

    #[test]
    fn dates_fall_back_to_the_raw_string() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(
            format_date(Some("2026-03-01T10:30:00")),
            "01/03/2026 10:30"
        );
        assert_eq!(format_date(Some("amanhã")), "amanhã");
    }

    #[test]
    fn money_is_rounded_to_two_decimals() {
        let amount: Decimal = "32.974".parse().unwrap();
        assert_eq!(format_money(amount), "32.97 €");
        let amount: Decimal = "9.9".parse().unwrap();
        assert_eq!(format_money(amount), "9.90 €");
    }
}
