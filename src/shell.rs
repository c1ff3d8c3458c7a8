// src/shell.rs

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use tokio_util::sync::CancellationToken;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        guards::{GuardDecision, evaluate},
        routes::Route,
    },
    models::product::ProductPayload,
    services::roles::{Role, snapshot_role},
    views::{
        commands::{CommandDetailView, CommandFormView, CommandsListView, MyCommandsView},
        products::{FormMode, ProductDetailView, ProductFormView, ProductsListView},
        profile::ProfileView,
        state::print_error_with_retry,
    },
};

enum Flow {
    Continue,
    Quit,
}

// Destino resolvido de uma navegação, depois dos guards.
enum ResolvedNav {
    View(Route),
    /// A cadeia terminou na entrada sem sessão: é preciso autenticar.
    Login,
}

enum NavResult {
    Done,
    LoginRequired,
}

// A view atualmente montada. Formulários são modais (rodam até o fim dentro
// da navegação) e por isso não aparecem aqui.
enum ActiveView {
    None,
    ProductsList(ProductsListView),
    ProductDetail(ProductDetailView),
    CommandsList(CommandsListView),
    MyCommands(MyCommandsView),
    CommandDetail(CommandDetailView),
    Profile(ProfileView),
}

/// O hospedeiro interativo: lê um comando por linha, traduz em navegação e
/// deixa guards e views fazerem o resto.
pub struct Shell {
    app: AppState,
    current: Route,
    active: ActiveView,
    // Token da view ativa; navegar cancela o fetch em voo da anterior.
    cancel: CancellationToken,
}

impl Shell {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            current: Route::Entry,
            active: ActiveView::None,
            cancel: CancellationToken::new(),
        }
    }

    pub async fn run(&mut self) -> Result<(), AppError> {
        let mut rl = DefaultEditor::new().map_err(|e| AppError::InternalError(e.into()))?;
        println!("Bem-vindo à Loja! Digite 'help' para ver os comandos.");

        loop {
            // Login obrigatório: sem sessão nenhuma view renderiza.
            if !self.app.session.is_authenticated() {
                if !self.login(&mut rl).await? {
                    break;
                }
                match self.navigate(Route::Entry).await {
                    Ok(_) => {}
                    Err(AppError::AuthExpired { .. }) | Err(AppError::Cancelled) => continue,
                    Err(err) => return Err(err),
                }
            }

            let prompt = format!("loja:{}> ", self.current.path());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);
                    match self.handle(&line).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(AppError::AuthExpired { .. }) => {
                            // A camada de requisição já derrubou a sessão;
                            // o topo do loop pede login de novo.
                            println!("🔒 Sua sessão expirou, faça login novamente.");
                            self.active = ActiveView::None;
                            self.current = Route::Entry;
                        }
                        Err(AppError::Cancelled) => {}
                        Err(err) => return Err(err),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(AppError::InternalError(err.into())),
            }
        }

        println!("Até logo!");
        Ok(())
    }

    // Pede credenciais até autenticar. `false` quando o usuário desistiu.
    async fn login(&mut self, rl: &mut DefaultEditor) -> Result<bool, AppError> {
        loop {
            let username = match rl.readline("Usuário: ") {
                Ok(s) => s.trim().to_string(),
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(false),
                Err(err) => return Err(AppError::InternalError(err.into())),
            };
            if username.is_empty() {
                continue;
            }
            let password = rpassword::prompt_password("Senha: ")
                .map_err(|e| AppError::InternalError(e.into()))?;

            match self.app.auth.login(&username, &password).await {
                Ok(()) => {
                    let snapshot = self.app.session.snapshot();
                    let role = snapshot_role(&snapshot).unwrap_or(Role::Client);
                    tracing::info!("✅ Autenticado como {} ({})", username, role.label());
                    return Ok(true);
                }
                Err(AppError::InvalidCredentials) => {
                    println!("Usuário ou senha inválidos, tente de novo.");
                }
                Err(AppError::NetworkError(err)) => {
                    println!("Sem resposta do provedor de identidade: {}", err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    // ---
    // Navegação
    // ---

    // Resolve a rota final: segue a cadeia de guards (curto-circuito) e os
    // redirecionamentos até um destino renderizável, com limite de saltos.
    fn resolve(&self, start: Route) -> ResolvedNav {
        let snapshot = self.app.session.snapshot();
        let mut route = start;
        for _ in 0..8 {
            if route == Route::Entry {
                if snapshot.is_authenticated() {
                    route = Route::Products;
                    continue;
                }
                return ResolvedNav::Login;
            }
            match evaluate(route.guards(), &snapshot) {
                GuardDecision::Allow => return ResolvedNav::View(route),
                GuardDecision::Redirect(target) => {
                    route = target;
                }
            }
        }
        ResolvedNav::Login
    }

    async fn navigate(&mut self, route: Route) -> Result<NavResult, AppError> {
        let mut target = route;
        loop {
            match self.resolve(target.clone()) {
                ResolvedNav::Login => {
                    self.active = ActiveView::None;
                    self.current = Route::Entry;
                    return Ok(NavResult::LoginRequired);
                }
                ResolvedNav::View(route) => match self.show(route).await? {
                    Some(next) => target = next,
                    None => return Ok(NavResult::Done),
                },
            }
        }
    }

    // Monta a view da rota: a anterior é desmontada e o fetch dela, se ainda
    // estiver em voo, é cancelado. Devolve uma navegação de continuação
    // quando a view (um formulário) termina navegando para outro lugar.
    async fn show(&mut self, route: Route) -> Result<Option<Route>, AppError> {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();

        let snapshot = self.app.session.snapshot();
        let role = snapshot_role(&snapshot).unwrap_or(Role::Client);

        let follow_up = match route.clone() {
            Route::Entry => Some(Route::Products),
            Route::Products => {
                let mut view = ProductsListView::new(cancel);
                view.load(&self.app).await?;
                view.render(role);
                self.active = ActiveView::ProductsList(view);
                None
            }
            Route::ProductDetail(id) => {
                let mut view = ProductDetailView::new(id, cancel);
                view.load(&self.app).await?;
                view.render(role);
                self.active = ActiveView::ProductDetail(view);
                None
            }
            Route::ProductNew => self.product_form(FormMode::Create).await?,
            Route::ProductEdit(id) => self.product_form(FormMode::Edit(id)).await?,
            Route::Commands => {
                let mut view = CommandsListView::new(cancel);
                view.load(&self.app).await?;
                view.render();
                self.active = ActiveView::CommandsList(view);
                None
            }
            Route::CommandDetail(id) => {
                let mut view = CommandDetailView::new(id, cancel);
                view.load(&self.app).await?;
                view.render();
                self.active = ActiveView::CommandDetail(view);
                None
            }
            Route::CommandNew => self.command_form().await?,
            Route::MyCommands => {
                let session = snapshot.session().ok_or(AppError::SessionNotInitialized)?;
                let mut view = MyCommandsView::new(cancel);
                view.load(&self.app, session.claims.sub).await?;
                view.render();
                self.active = ActiveView::MyCommands(view);
                None
            }
            Route::Profile => {
                let mut view = ProfileView::new();
                view.load(&snapshot)?;
                view.render();
                self.active = ActiveView::Profile(view);
                None
            }
        };

        if follow_up.is_none() {
            self.current = route;
        }
        Ok(follow_up)
    }

    // ---
    // Formulários (modais)
    // ---

    async fn product_form(&mut self, mode: FormMode) -> Result<Option<Route>, AppError> {
        let mut view = ProductFormView::new(mode.clone(), self.cancel.clone());
        view.load(&self.app).await?;
        if let Some(message) = view.state.error() {
            print_error_with_retry(message);
            return Ok(Some(Route::Products));
        }

        match &mode {
            FormMode::Create => println!("== Adicionar um produto =="),
            FormMode::Edit(_) => println!("== Modificar o produto =="),
        }
        let current = view.current().cloned();
        if current.is_some() {
            println!("(deixe em branco para manter o valor atual)");
        }

        let name = prompt_with_default(
            "Nome do produto",
            current.as_ref().map(|p| p.name.clone()),
        )?;
        let description = prompt_with_default(
            "Descrição",
            current.as_ref().and_then(|p| p.description.clone()),
        )?;
        let price_raw = prompt_with_default(
            "Preço (€)",
            current.as_ref().map(|p| p.price.to_string()),
        )?;
        let quantity_raw = prompt_with_default(
            "Quantidade",
            current.as_ref().map(|p| p.quantity.to_string()),
        )?;

        let Ok(price) = price_raw.parse() else {
            println!("⚠️  Preço inválido.");
            return Ok(Some(Route::Products));
        };
        let Ok(quantity) = quantity_raw.parse() else {
            println!("⚠️  Quantidade inválida.");
            return Ok(Some(Route::Products));
        };

        let payload = ProductPayload {
            name,
            description: if description.is_empty() {
                None
            } else {
                Some(description)
            },
            price,
            quantity,
        };

        // Validação inválida ou erro do serviço: a mensagem já saiu inline;
        // a navegação volta para a lista de qualquer jeito.
        let nav = view.submit(&self.app, payload).await?;
        Ok(Some(nav.unwrap_or(Route::Products)))
    }

    async fn command_form(&mut self) -> Result<Option<Route>, AppError> {
        let mut view = CommandFormView::new(self.cancel.clone());
        view.load(&self.app).await?;
        if let Some(message) = view.products.error() {
            print_error_with_retry(message);
            return Ok(Some(Route::MyCommands));
        }
        let products = view.products.success().cloned().unwrap_or_default();
        if products.is_empty() {
            println!("Nenhum produto disponível para montar uma command.");
            return Ok(Some(Route::Products));
        }

        println!("== Criar uma command ==");
        for (i, product) in products.iter().enumerate() {
            println!(
                "  {}. {}  {}  (estoque: {})",
                i + 1,
                product.name,
                crate::views::state::format_money(product.price),
                product.quantity
            );
        }
        println!("Use: add <n> <quantidade> | rm <n> | ok | cancel");

        loop {
            view.render_selection();
            let line = prompt("command")?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                ["add", n, qty] => {
                    let (Ok(n), Ok(qty)) = (n.parse::<usize>(), qty.parse::<i64>()) else {
                        println!("⚠️  Use: add <n> <quantidade>");
                        continue;
                    };
                    match products.get(n.wrapping_sub(1)) {
                        Some(product) => view.add_line(product.clone(), qty),
                        None => println!("⚠️  Produto {} não existe na lista.", n),
                    }
                }
                ["rm", n] => {
                    let Ok(n) = n.parse::<usize>() else {
                        println!("⚠️  Use: rm <n>");
                        continue;
                    };
                    if !view.remove_line(n.wrapping_sub(1)) {
                        println!("⚠️  Linha {} não existe.", n);
                    }
                }
                ["ok"] => match view.submit(&self.app).await? {
                    Some(route) => return Ok(Some(route)),
                    None => continue,
                },
                ["cancel"] => return Ok(Some(Route::MyCommands)),
                _ => println!("Use: add <n> <quantidade> | rm <n> | ok | cancel"),
            }
        }
    }

    // ---
    // Comandos do prompt
    // ---

    async fn handle(&mut self, line: &str) -> Result<Flow, AppError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.as_slice() {
            ["help"] => {
                print_help();
            }
            ["quit"] | ["exit"] => return Ok(Flow::Quit),
            ["logout"] => {
                if confirm("Tem certeza que quer encerrar a sessão?")? {
                    self.app.auth.logout().await;
                    self.active = ActiveView::None;
                    self.current = Route::Entry;
                }
            }
            ["retry"] | ["reload"] => {
                let current = self.current.clone();
                self.navigate(current).await?;
            }
            ["profile"] => {
                self.navigate(Route::Profile).await?;
            }
            ["products"] => {
                self.navigate(Route::Products).await?;
            }
            ["products", id] => {
                self.navigate(Route::ProductDetail(id.to_string())).await?;
            }
            ["commands"] => {
                self.navigate(Route::Commands).await?;
            }
            ["commands", id] => {
                self.navigate(Route::CommandDetail(id.to_string())).await?;
            }
            ["my-commands"] => {
                self.navigate(Route::MyCommands).await?;
            }
            ["new"] => {
                // Sensível ao contexto: produto nas telas de produto,
                // command nas telas de command.
                let route = match self.current {
                    Route::Commands | Route::MyCommands | Route::CommandDetail(_) => {
                        Route::CommandNew
                    }
                    _ => Route::ProductNew,
                };
                self.navigate(route).await?;
            }
            ["edit", id] => {
                self.navigate(Route::ProductEdit(id.to_string())).await?;
            }
            ["delete", id] => {
                self.delete_product(id).await?;
            }
            ["go", path] => match Route::parse(path) {
                Some(route) => {
                    self.navigate(route).await?;
                }
                None => println!("Caminho desconhecido: {}", path),
            },
            [path] if path.starts_with('/') => match Route::parse(path) {
                Some(route) => {
                    self.navigate(route).await?;
                }
                None => println!("Caminho desconhecido: {}", path),
            },
            _ => println!("Comando desconhecido. Digite 'help'."),
        }

        Ok(Flow::Continue)
    }

    async fn delete_product(&mut self, id: &str) -> Result<(), AppError> {
        let snapshot = self.app.session.snapshot();
        if snapshot_role(&snapshot) != Some(Role::Admin) {
            println!("Somente administradores podem remover produtos.");
            return Ok(());
        }

        let follow_up = match &mut self.active {
            ActiveView::ProductsList(view) => {
                let confirmed = confirm("Tem certeza que quer remover este produto?")?;
                view.delete(&self.app, id, confirmed).await?;
                None
            }
            ActiveView::ProductDetail(view) if view.id == id => {
                let confirmed = confirm("Tem certeza que quer remover este produto?")?;
                view.delete(&self.app, confirmed).await?
            }
            _ => {
                println!("O comando delete funciona na lista ou no detalhe de produtos.");
                None
            }
        };

        if let Some(route) = follow_up {
            self.navigate(route).await?;
        }
        Ok(())
    }
}

// ---
// Prompts simples (stdin), para confirmações e campos de formulário
// ---

fn prompt(label: &str) -> Result<String, AppError> {
    print!("{}> ", label);
    std::io::stdout()
        .flush()
        .map_err(|e| AppError::InternalError(e.into()))?;
    let mut s = String::new();
    std::io::stdin()
        .read_line(&mut s)
        .map_err(|e| AppError::InternalError(e.into()))?;
    Ok(s.trim().to_string())
}

fn prompt_with_default(label: &str, default: Option<String>) -> Result<String, AppError> {
    let shown = match &default {
        Some(value) if !value.is_empty() => format!("{} [{}]", label, value),
        _ => label.to_string(),
    };
    let answer = prompt(&shown)?;
    if answer.is_empty() {
        Ok(default.unwrap_or_default())
    } else {
        Ok(answer)
    }
}

fn confirm(question: &str) -> Result<bool, AppError> {
    let answer = prompt(&format!("{} [s/N]", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "s" | "sim" | "y"))
}

fn print_help() {
    println!("Comandos disponíveis:");
    println!("  products [id]     lista de produtos / detalhe de um produto");
    println!("  new               novo produto (admin) ou nova command (cliente)");
    println!("  edit <id>         editar um produto (admin)");
    println!("  delete <id>       remover um produto (admin)");
    println!("  commands [id]     commands de todos os clientes (admin) / detalhe");
    println!("  my-commands       minhas commands (cliente)");
    println!("  profile           meu perfil");
    println!("  retry             tenta o último carregamento de novo");
    println!("  go <caminho>      navega por caminho, ex.: go /products/5");
    println!("  logout            encerra a sessão");
    println!("  quit              sai do cliente");
}
