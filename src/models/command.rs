// src/models/command.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::product::Product;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "PENDING",
            CommandStatus::Confirmed => "CONFIRMED",
            CommandStatus::Shipped => "SHIPPED",
            CommandStatus::Delivered => "DELIVERED",
            CommandStatus::Cancelled => "CANCELLED",
        }
    }

    /// Código ANSI da cor do status no terminal, seguindo o mesmo mapa de
    /// cores das listas (pendente = amarelo, cancelada = vermelho...).
    pub fn ansi_color(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "\x1b[33m",
            CommandStatus::Confirmed | CommandStatus::Delivered => "\x1b[32m",
            CommandStatus::Shipped => "\x1b[34m",
            CommandStatus::Cancelled => "\x1b[31m",
        }
    }
}

// --- Structs de leitura (command-service) ---

// Linha da command: o produto pode vir nulo se tiver sido apagado do
// catálogo depois da compra.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandProduct {
    pub product: Option<Product>,
    pub quantity: i64,
}

impl CommandProduct {
    pub fn line_total(&self) -> Decimal {
        let price = self
            .product
            .as_ref()
            .map(|p| p.price)
            .unwrap_or(Decimal::ZERO);
        price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,
    pub client_id: Uuid,
    // O serviço manda a data como string ISO; guardamos cru e formatamos na
    // view (com fallback para o valor original se não der para interpretar).
    pub date: Option<String>,
    pub status: CommandStatus,
    pub amount: Decimal,
    #[serde(default)]
    pub products: Vec<CommandProduct>,
}

// --- Structs de criação ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommandProductInput {
    pub product_id: String,
    pub quantity: i64,
}

// Corpo do POST /command-service/commands. O clientId vem do subject do
// token, nunca de input do usuário.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommandPayload {
    pub client_id: Uuid,
    pub products: Vec<CommandProductInput>,
}

// --- Seleção local do formulário de command ---

// Uma linha escolhida no formulário, antes do submit.
#[derive(Debug, Clone)]
pub struct LineSelection {
    pub product: Product,
    pub quantity: i64,
}

impl LineSelection {
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Total da seleção: soma de preço x quantidade de cada linha.
pub fn selection_total(lines: &[LineSelection]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc + line.line_total())
}

impl CreateCommandPayload {
    /// Monta o corpo do POST a partir da seleção do formulário.
    pub fn from_selection(client_id: Uuid, lines: &[LineSelection]) -> Self {
        Self {
            client_id,
            products: lines
                .iter()
                .map(|line| CommandProductInput {
                    product_id: line.product.id.clone(),
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Produto {}", id),
            description: None,
            price: price.parse().unwrap(),
            quantity: stock,
        }
    }

    #[test]
    fn selection_total_is_the_sum_of_price_times_quantity() {
        let lines = vec![
            LineSelection {
                product: product("1", "9.99", 10),
                quantity: 3,
            },
            LineSelection {
                product: product("2", "1.50", 5),
                quantity: 2,
            },
        ];
        // 9.99 * 3 + 1.50 * 2 = 32.97
        let total = selection_total(&lines);
        assert_eq!(total.round_dp(2).to_string(), "32.97");
    }

    #[test]
    fn payload_carries_the_token_subject_and_the_selected_pairs() {
        let client_id = Uuid::new_v4();
        let lines = vec![
            LineSelection {
                product: product("a", "2.00", 4),
                quantity: 1,
            },
            LineSelection {
                product: product("b", "3.00", 9),
                quantity: 4,
            },
        ];
        let payload = CreateCommandPayload::from_selection(client_id, &lines);

        assert_eq!(payload.client_id, client_id);
        assert_eq!(
            payload.products,
            vec![
                CommandProductInput {
                    product_id: "a".to_string(),
                    quantity: 1
                },
                CommandProductInput {
                    product_id: "b".to_string(),
                    quantity: 4
                },
            ]
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["clientId"], client_id.to_string());
        assert_eq!(json["products"][0]["productId"], "a");
        assert_eq!(json["products"][1]["quantity"], 4);
    }

    #[test]
    fn status_round_trips_in_screaming_snake_case() {
        let status: CommandStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(status, CommandStatus::Pending);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"PENDING\"");
    }

    #[test]
    fn line_total_of_a_missing_product_is_zero() {
        let line = CommandProduct {
            product: None,
            quantity: 7,
        };
        assert_eq!(line.line_total(), Decimal::ZERO);
    }
}
