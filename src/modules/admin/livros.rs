use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use elibros_authz::AdminSession;
use elibros_client::models::{Livro, LivroFiltro, LivroInput, Taxonomia, Termo};
use elibros_client::Auth;
use elibros_http::{AppError, FieldErrors};
use elibros_kernel::openapi::{
    array_of, authed_operation, error_response, json_response, object, schema_ref,
};
use elibros_search::{filter_contains, pick, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use super::{amount, is_blank, ListQuery};
use crate::state::AppState;
use crate::utils::{non_blank, parse_id};

const INVALID_BOOK_ID: &str = "ID do livro inválido";

#[derive(Debug, Default, Deserialize)]
pub struct BookQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub subtitulo: Option<String>,
    #[serde(default)]
    pub sinopse: Option<String>,
    #[serde(default)]
    pub editora: String,
    #[serde(default, alias = "ISBN")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub data_de_publicacao: Option<String>,
    #[serde(default)]
    pub ano_de_publicacao: Option<i32>,
    #[serde(default)]
    pub preco: Option<Value>,
    #[serde(default)]
    pub desconto: Option<Value>,
    #[serde(default)]
    pub quantidade: Option<i64>,
    #[serde(default)]
    pub autor: Vec<u64>,
    #[serde(default)]
    pub categoria: Vec<u64>,
    #[serde(default)]
    pub genero: Vec<u64>,
}

/// Publication date as `YYYY-MM-DD`, from `YYYY-MM-DD`, `DD/MM/YYYY` or an
/// ISO timestamp.
pub fn normalize_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(date);
    }
    if let Ok(date) = Date::parse(raw, format_description!("[day]/[month]/[year]")) {
        return Some(date);
    }
    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(instant.date());
    }
    // Naive timestamps such as `2020-05-17T00:00:00`.
    raw.split_once('T')
        .and_then(|(date, _)| Date::parse(date, format_description!("[year]-[month]-[day]")).ok())
}

impl BookForm {
    fn validate(self) -> Result<LivroInput, AppError> {
        let preco = amount(self.preco.as_ref());
        let desconto = amount(self.desconto.as_ref());
        let quantidade = self.quantidade.unwrap_or(0);
        let estoque = u32::try_from(quantidade).ok();
        let data = non_blank(self.data_de_publicacao);
        let publicacao = data.as_deref().and_then(normalize_date);

        let mut errors = FieldErrors::new();
        errors
            .require("titulo", &self.titulo, "Título é obrigatório")
            .require("editora", &self.editora, "Editora é obrigatória");
        if is_blank(self.preco.as_ref()) {
            errors.check(false, "preco", "Preço é obrigatório");
        } else {
            errors.check(
                preco.is_some_and(|p| p >= 0.0),
                "preco",
                "Preço deve ser um valor válido",
            );
        }
        if !is_blank(self.desconto.as_ref()) {
            errors.check(
                desconto.is_some_and(|d| d >= 0.0),
                "desconto",
                "Desconto deve ser um valor válido",
            );
        }
        if quantidade < 0 {
            errors.check(false, "quantidade", "Estoque não pode ser negativo");
        } else {
            errors.check(estoque.is_some(), "quantidade", "Estoque acima do limite permitido");
        }
        errors.check(
            data.is_none() || publicacao.is_some(),
            "data_de_publicacao",
            "Data de publicação inválida",
        );
        errors.finish()?;

        Ok(LivroInput {
            titulo: self.titulo.trim().to_string(),
            subtitulo: non_blank(self.subtitulo),
            sinopse: non_blank(self.sinopse),
            editora: self.editora.trim().to_string(),
            isbn: non_blank(self.isbn),
            data_de_publicacao: publicacao.map(|date| date.to_string()),
            ano_de_publicacao: self.ano_de_publicacao.or_else(|| publicacao.map(Date::year)),
            preco: preco.unwrap_or_default(),
            desconto,
            quantidade: estoque.unwrap_or_default(),
            autor: self.autor,
            categoria: self.categoria,
            genero: self.genero,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PickerQuery {
    #[serde(default)]
    pub livro_id: Option<u64>,
    #[serde(default)]
    pub autor: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub genero: Option<String>,
}

/// One multi-select of the book form.
#[derive(Debug, Serialize)]
pub struct Picker {
    pub selecionados: Vec<u64>,
    pub opcoes: Vec<Termo>,
}

#[derive(Debug, Serialize)]
pub struct PickerOptions {
    pub autores: Picker,
    pub categorias: Picker,
    pub generos: Picker,
}

impl Picker {
    /// `names` are the book's current entries, matched to ids by name.
    fn build(termos: &[Termo], names: &[String], term: Option<&str>) -> Self {
        let selecionados: Vec<u64> = termos
            .iter()
            .filter(|termo| {
                let nome = termo.nome.trim().to_lowercase();
                names.iter().any(|name| name.trim().to_lowercase() == nome)
            })
            .map(|termo| termo.id)
            .collect();
        let opcoes = pick(
            termos,
            term.unwrap_or(""),
            |termo| termo.nome.as_str(),
            |termo| selecionados.contains(&termo.id),
        );
        Self { selecionados, opcoes }
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/opcoes", get(options))
        .route("/{id}", get(detail).put(update).delete(remove))
}

pub(super) fn paths() -> Value {
    json!({
        "/": {
            "get": authed_operation("Admin books", "Books filtered by title", None, vec![
                ("200", json_response("Books", array_of("Livro")))
            ]),
            "post": authed_operation(
                "Admin books",
                "Create a book",
                Some(schema_ref("BookForm")),
                vec![
                    ("201", json_response("Created book", schema_ref("Livro"))),
                    ("422", error_response("Invalid form"))
                ],
            )
        },
        "/opcoes": {
            "get": authed_operation("Admin books", "Author, category and genre pickers", None, vec![
                ("200", json_response("Picker options", schema_ref("PickerOptions")))
            ])
        },
        "/{id}": {
            "get": authed_operation("Admin books", "One book", None, vec![
                ("200", json_response("Book", schema_ref("Livro"))),
                ("404", error_response("Unknown book"))
            ]),
            "put": authed_operation(
                "Admin books",
                "Replace a book",
                Some(schema_ref("BookForm")),
                vec![
                    ("200", json_response("Updated book", schema_ref("Livro"))),
                    ("422", error_response("Invalid form"))
                ],
            ),
            "delete": authed_operation("Admin books", "Delete a book", None, vec![
                ("204", json!({ "description": "Deleted" }))
            ])
        }
    })
}

pub(super) fn schemas() -> Value {
    let names = json!({ "type": "array", "items": { "type": "string" } });
    let ids = json!({ "type": "array", "items": { "type": "integer" } });
    let picker = object(
        json!({ "selecionados": ids, "opcoes": array_of("Termo") }),
        &["selecionados", "opcoes"],
    );
    json!({
        "Livro": object(json!({
            "id": { "type": "integer" },
            "titulo": { "type": "string" },
            "editora": { "type": "string" },
            "ISBN": { "type": "string", "nullable": true },
            "data_de_publicacao": { "type": "string", "nullable": true },
            "preco": { "type": "string" },
            "quantidade": { "type": "integer", "nullable": true },
            "autores": names,
            "categorias": names,
            "generos": names
        }), &["id", "titulo", "preco"]),
        "BookForm": object(json!({
            "titulo": { "type": "string" },
            "subtitulo": { "type": "string" },
            "sinopse": { "type": "string" },
            "editora": { "type": "string" },
            "isbn": { "type": "string" },
            "data_de_publicacao": { "type": "string" },
            "preco": { "type": "string" },
            "desconto": { "type": "string" },
            "quantidade": { "type": "integer", "minimum": 0 },
            "autor": ids,
            "categoria": ids,
            "genero": ids
        }), &["titulo", "editora", "preco"]),
        "PickerOptions": object(json!({
            "autores": picker,
            "categorias": picker,
            "generos": picker
        }), &["autores", "categorias", "generos"])
    })
}

async fn list(
    State(state): State<AppState>,
    admin: AdminSession,
    Query(query): Query<BookQuery>,
) -> Result<Json<Vec<Livro>>, AppError> {
    let filtro = LivroFiltro {
        page: query.page,
        ..LivroFiltro::default()
    };
    let livros = state.api.livros(&filtro, admin.0.auth()).await?.into_results();

    let list = ListQuery {
        search: query.search,
        ordering: query.ordering,
    };
    Ok(Json(filter_contains(
        &livros,
        list.term(),
        list.direction(SortDirection::Ascending),
        |livro| livro.titulo.as_str(),
    )))
}

async fn detail(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<Livro>, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    Ok(Json(state.api.livro(id, admin.0.auth()).await?))
}

async fn create(
    State(state): State<AppState>,
    admin: AdminSession,
    Json(form): Json<BookForm>,
) -> Result<(StatusCode, Json<Livro>), AppError> {
    let input = form.validate()?;
    let livro = state.api.criar_livro(&input, admin.token()).await?;
    tracing::info!(livro_id = livro.id, titulo = %livro.titulo, "book created");
    Ok((StatusCode::CREATED, Json(livro)))
}

async fn update(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    Json(form): Json<BookForm>,
) -> Result<Json<Livro>, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    let input = form.validate()?;
    Ok(Json(state.api.atualizar_livro(id, &input, admin.token()).await?))
}

async fn remove(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    state.api.remover_livro(id, admin.token()).await?;
    tracing::info!(livro_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn options(
    State(state): State<AppState>,
    admin: AdminSession,
    Query(query): Query<PickerQuery>,
) -> Result<Json<PickerOptions>, AppError> {
    let auth: Auth<'_> = admin.0.auth();
    let livro = async {
        match query.livro_id {
            Some(id) => state.api.livro(id, auth).await.map(Some),
            None => Ok(None),
        }
    };
    let (autores, categorias, generos, livro) = tokio::join!(
        state.api.termos(Taxonomia::Autores, auth),
        state.api.termos(Taxonomia::Categorias, auth),
        state.api.termos(Taxonomia::Generos, auth),
        livro
    );
    let livro = livro?;

    let empty = Vec::new();
    let (nomes_autores, nomes_categorias, nomes_generos) = match &livro {
        Some(livro) => (&livro.autores, &livro.categorias, &livro.generos),
        None => (&empty, &empty, &empty),
    };

    Ok(Json(PickerOptions {
        autores: Picker::build(&autores?, nomes_autores, query.autor.as_deref()),
        categorias: Picker::build(&categorias?, nomes_categorias, query.categoria.as_deref()),
        generos: Picker::build(&generos?, nomes_generos, query.genero.as_deref()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::admin::create_module;
    use crate::modules::testing::{call, get as get_json, mount_admin, state_for};
    use axum::http::Method;
    use time::macros::date;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form(value: Value) -> BookForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn publication_dates_are_normalised() {
        assert_eq!(normalize_date("2020-05-17"), Some(date!(2020 - 05 - 17)));
        assert_eq!(normalize_date("17/05/2020"), Some(date!(2020 - 05 - 17)));
        assert_eq!(normalize_date("2020-05-17T03:00:00Z"), Some(date!(2020 - 05 - 17)));
        assert_eq!(normalize_date("2020-05-17T03:00:00"), Some(date!(2020 - 05 - 17)));
        assert_eq!(normalize_date("maio de 2020"), None);
    }

    #[test]
    fn form_validation_collects_every_field() {
        let err = form(json!({"preco": "-1", "quantidade": -2})).validate().unwrap_err();
        match err {
            AppError::Validation { message, details, .. } => {
                assert_eq!(message, "Título é obrigatório");
                let fields: Vec<&str> =
                    details.iter().filter_map(|d| d["field"].as_str()).collect();
                assert_eq!(fields, ["titulo", "editora", "preco", "quantidade"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn valid_forms_become_backend_input() {
        let input = form(json!({
            "titulo": " Dom Casmurro ",
            "editora": "Garnier",
            "preco": "39,90",
            "quantidade": 4,
            "data_de_publicacao": "01/01/1899",
            "autor": [1]
        }))
        .validate()
        .unwrap();
        assert_eq!(input.titulo, "Dom Casmurro");
        assert_eq!(input.preco, 39.9);
        assert_eq!(input.data_de_publicacao.as_deref(), Some("1899-01-01"));
        assert_eq!(input.ano_de_publicacao, Some(1899));
        assert_eq!(input.quantidade, 4);
    }

    #[test]
    fn stock_beyond_the_backend_range_is_refused() {
        let err = form(json!({
            "titulo": "A",
            "editora": "B",
            "preco": "10",
            "quantidade": 5_000_000_000_i64
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { ref message, .. }
                if message == "Estoque acima do limite permitido"
        ));
    }

    #[test]
    fn missing_price_has_its_own_message() {
        let err = form(json!({"titulo": "A", "editora": "B", "preco": ""})).validate().unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { ref message, .. } if message == "Preço é obrigatório"
        ));
    }

    #[test]
    fn pickers_put_the_books_entries_first() {
        let termos = vec![
            Termo { id: 1, nome: "Aluísio Azevedo".into() },
            Termo { id: 2, nome: "Machado de Assis".into() },
            Termo { id: 3, nome: "José de Alencar".into() },
        ];
        let picker = Picker::build(&termos, &["machado de assis".to_string()], None);
        assert_eq!(picker.selecionados, [2]);
        let ids: Vec<u64> = picker.opcoes.iter().map(|t| t.id).collect();
        assert_eq!(ids, [2, 1, 3]);

        let accented = vec![Termo { id: 7, nome: "Érico Veríssimo".into() }];
        let picker = Picker::build(&accented, &["ÉRICO VERÍSSIMO".to_string()], None);
        assert_eq!(picker.selecionados, [7]);

        let picker = Picker::build(&termos, &[], Some("de"));
        let ids: Vec<u64> = picker.opcoes.iter().map(|t| t.id).collect();
        assert_eq!(ids, [3, 2]);
    }

    #[tokio::test]
    async fn list_filters_by_title() {
        let server = MockServer::start().await;
        mount_admin(&server, "staff").await;
        Mock::given(method("GET"))
            .and(path("/api/v1/livros/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "results": [
                    {"id": 1, "titulo": "O Cortiço", "preco": "20.00"},
                    {"id": 2, "titulo": "Dom Casmurro", "preco": "39.90"},
                    {"id": 3, "titulo": "Memórias Póstumas de Brás Cubas", "preco": "30.00"}
                ]
            })))
            .mount(&server)
            .await;
        let router = create_module(state_for(&server)).routes();

        let (status, body) = get_json(
            &router,
            "/livros?search=o&ordering=-titulo",
            Some("staff"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|l| l["id"].as_u64())
            .collect();
        assert_eq!(ids, [1, 3, 2]);
    }

    #[tokio::test]
    async fn options_resolve_the_books_names() {
        let server = MockServer::start().await;
        mount_admin(&server, "staff").await;
        Mock::given(method("GET"))
            .and(path("/api/v1/livros/2/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 2, "titulo": "Dom Casmurro", "preco": "39.90",
                "autores": ["Machado de Assis"], "generos": ["Romance"]
            })))
            .mount(&server)
            .await;
        for (segment, body) in [
            (
                "autores",
                json!([
                    {"id": 1, "nome": "Aluísio Azevedo"},
                    {"id": 2, "nome": "Machado de Assis"}
                ]),
            ),
            ("categorias", json!([{"id": 5, "nome": "Clássicos"}])),
            ("generos", json!([{"id": 8, "nome": "Realismo"}, {"id": 9, "nome": "Romance"}])),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/api/v1/{segment}/")))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;
        }
        let router = create_module(state_for(&server)).routes();

        let (status, body) = get_json(&router, "/livros/opcoes?livro_id=2", Some("staff")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["autores"]["selecionados"], json!([2]));
        assert_eq!(body["autores"]["opcoes"][0]["id"], 2);
        assert_eq!(body["generos"]["opcoes"][0]["nome"], "Romance");
        assert_eq!(body["categorias"]["selecionados"], json!([]));
    }

    #[tokio::test]
    async fn update_puts_the_whole_record() {
        let server = MockServer::start().await;
        mount_admin(&server, "staff").await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/livros/2/"))
            .and(body_json(json!({
                "titulo": "Dom Casmurro",
                "editora": "Garnier",
                "preco": "42.00",
                "quantidade": 0,
                "autor": [2],
                "categoria": [],
                "genero": []
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    json!({"id": 2, "titulo": "Dom Casmurro", "preco": "42.00"}),
                ),
            )
            .expect(1)
            .mount(&server)
            .await;
        let router = create_module(state_for(&server)).routes();

        let (status, _) = call(
            &router,
            Method::PUT,
            "/livros/2",
            Some("staff"),
            Some(json!({
                "titulo": "Dom Casmurro",
                "editora": "Garnier",
                "preco": 42,
                "autor": [2]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
