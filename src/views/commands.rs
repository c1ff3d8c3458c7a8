// src/views/commands.rs

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::routes::Route,
    models::command::{
        Command, CreateCommandPayload, LineSelection, selection_total,
    },
    models::product::Product,
    views::state::{ViewState, absorb, format_date, format_money, print_error_with_retry},
};

const ANSI_RESET: &str = "\x1b[0m";

fn print_command_card(command: &Command) {
    println!(
        "  [{}] {}  {}{}{}  {}  ({} item(ns))",
        command.id,
        format_date(command.date.as_deref()),
        command.status.ansi_color(),
        command.status.as_str(),
        ANSI_RESET,
        format_money(command.amount),
        command.products.len()
    );
}

// ---
// View: todas as commands (administração)
// ---
pub struct CommandsListView {
    pub state: ViewState<Vec<Command>>,
    cancel: CancellationToken,
}

impl CommandsListView {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            state: ViewState::Idle,
            cancel,
        }
    }

    pub async fn load(&mut self, app: &AppState) -> Result<(), AppError> {
        self.state = ViewState::Loading;
        println!("⏳ Carregando commands...");
        absorb(&mut self.state, app.commands.list(&self.cancel).await)
    }

    pub fn render(&self) {
        match &self.state {
            ViewState::Success(commands) => {
                println!("== Commands (todas) ==");
                if commands.is_empty() {
                    println!("Nenhuma command disponível.");
                    return;
                }
                for command in commands {
                    print_command_card(command);
                }
                println!("Comandos: commands <id>");
            }
            ViewState::Error(message) => print_error_with_retry(message),
            _ => {}
        }
    }
}

// ---
// View: minhas commands (cliente)
// ---
pub struct MyCommandsView {
    pub state: ViewState<Vec<Command>>,
    cancel: CancellationToken,
}

impl MyCommandsView {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            state: ViewState::Idle,
            cancel,
        }
    }

    /// Busca as commands do subject do token.
    pub async fn load(&mut self, app: &AppState, client_id: Uuid) -> Result<(), AppError> {
        self.state = ViewState::Loading;
        println!("⏳ Carregando suas commands...");
        absorb(
            &mut self.state,
            app.commands.list_by_client(client_id, &self.cancel).await,
        )
    }

    pub fn render(&self) {
        match &self.state {
            ViewState::Success(commands) => {
                println!("== Minhas Commands ==");
                if commands.is_empty() {
                    println!("Nenhuma command ainda. Use 'new' para criar a primeira.");
                    return;
                }
                for command in commands {
                    print_command_card(command);
                }
                println!("Comandos: commands <id> | new");
            }
            ViewState::Error(message) => print_error_with_retry(message),
            _ => {}
        }
    }
}

// ---
// View: detalhe de command
// ---
pub struct CommandDetailView {
    pub id: String,
    pub state: ViewState<Command>,
    cancel: CancellationToken,
}

impl CommandDetailView {
    pub fn new(id: String, cancel: CancellationToken) -> Self {
        Self {
            id,
            state: ViewState::Idle,
            cancel,
        }
    }

    pub async fn load(&mut self, app: &AppState) -> Result<(), AppError> {
        self.state = ViewState::Loading;
        println!("⏳ Carregando command...");
        absorb(
            &mut self.state,
            app.commands.find_by_id(&self.id, &self.cancel).await,
        )
    }

    pub fn render(&self) {
        match &self.state {
            ViewState::Success(command) => {
                println!("== Command #{} ==", command.id);
                println!("  Data: {}", format_date(command.date.as_deref()));
                println!(
                    "  Status: {}{}{}",
                    command.status.ansi_color(),
                    command.status.as_str(),
                    ANSI_RESET
                );
                println!("  Montante total: {}", format_money(command.amount));
                if command.products.is_empty() {
                    println!("  Nenhum produto nesta command.");
                    return;
                }
                println!("  Produtos:");
                for line in &command.products {
                    let name = line
                        .product
                        .as_ref()
                        .map(|p| p.name.as_str())
                        .unwrap_or("Produto desconhecido");
                    let unit = line
                        .product
                        .as_ref()
                        .map(|p| p.price)
                        .unwrap_or(Decimal::ZERO);
                    println!(
                        "    {} x{}  {}  = {}",
                        name,
                        line.quantity,
                        format_money(unit),
                        format_money(line.line_total())
                    );
                }
            }
            ViewState::Error(message) => print_error_with_retry(message),
            _ => {}
        }
    }
}

// ---
// View: formulário de command (cliente)
// ---
pub struct CommandFormView {
    // Catálogo buscado para a seleção.
    pub products: ViewState<Vec<Product>>,
    pub lines: Vec<LineSelection>,
    cancel: CancellationToken,
}

impl CommandFormView {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            products: ViewState::Idle,
            lines: Vec::new(),
            cancel,
        }
    }

    pub async fn load(&mut self, app: &AppState) -> Result<(), AppError> {
        self.products = ViewState::Loading;
        println!("⏳ Carregando produtos disponíveis...");
        absorb(&mut self.products, app.products.list(&self.cancel).await)
    }

    /// Adiciona uma linha à seleção. A quantidade mínima é 1; acima do
    /// estoque o serviço é quem recusa, aqui só avisamos.
    pub fn add_line(&mut self, product: Product, quantity: i64) {
        let quantity = quantity.max(1);
        if quantity > product.quantity {
            println!(
                "⚠️  Quantidade acima do estoque ({}) de \"{}\".",
                product.quantity, product.name
            );
        }
        self.lines.push(LineSelection { product, quantity });
    }

    pub fn remove_line(&mut self, index: usize) -> bool {
        if index < self.lines.len() {
            self.lines.remove(index);
            true
        } else {
            false
        }
    }

    pub fn total(&self) -> Decimal {
        selection_total(&self.lines)
    }

    pub fn render_selection(&self) {
        if self.lines.is_empty() {
            println!("Nenhum produto adicionado. Use 'add <n> <quantidade>'.");
            return;
        }
        for (i, line) in self.lines.iter().enumerate() {
            println!(
                "  {}. {} x{}  = {}",
                i + 1,
                line.product.name,
                line.quantity,
                format_money(line.line_total())
            );
        }
        println!("  Montante total: {}", format_money(self.total()));
    }

    /// Envia a command. O clientId sai do subject do token; sem ao menos uma
    /// linha o submit é bloqueado antes de qualquer chamada.
    pub async fn submit(&mut self, app: &AppState) -> Result<Option<Route>, AppError> {
        if self.lines.is_empty() {
            println!("⚠️  Adicione ao menos um produto à command.");
            return Ok(None);
        }
        let snapshot = app.session.snapshot();
        let Some(session) = snapshot.session() else {
            // Sem sessão não há identificador de cliente.
            return Err(AppError::SessionNotInitialized);
        };

        let payload = CreateCommandPayload::from_selection(session.claims.sub, &self.lines);
        match app.commands.create(&payload, &self.cancel).await {
            Ok(()) => {
                println!("✅ Command criada.");
                Ok(Some(Route::MyCommands))
            }
            Err(err @ (AppError::AuthExpired { .. } | AppError::Cancelled)) => Err(err),
            Err(err) => {
                println!("Erro ao criar a command: {}", err.user_message());
                Ok(None)
            }
        }
    }
}
