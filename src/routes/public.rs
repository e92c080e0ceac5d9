use actix_web::{web, HttpRequest, HttpResponse, Result};
use askama::Template;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::booking::{self, ContactInfo};
use crate::identity;
use crate::loyalty::{loyalty_status, LOYALTY_THRESHOLD};
use crate::models::{find_service, format_price, service_catalog, Booking, Client};
use crate::notify;
use crate::repo;
use crate::slots::{active_on_date, compute_slots};
use crate::state::AppState;
use crate::templates::render;

#[derive(Clone, Debug)]
struct ServiceCard {
    id: String,
    name: String,
    description: String,
    price_label: String,
    duration_label: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    name: String,
    visits: u32,
    remaining: u32,
    free_next: bool,
    services: Vec<ServiceCard>,
}

#[derive(Clone, Debug, Default)]
struct BookingFormView {
    name: String,
    phone: String,
    plate: String,
}

#[derive(Template)]
#[template(path = "book.html")]
struct BookTemplate {
    services: Vec<ServiceCard>,
    selected_service: String,
    date: String,
    today: String,
    slots: Vec<String>,
    has_slots: bool,
    posts_count: u32,
    free_next: bool,
    form: BookingFormView,
    errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "book_success.html")]
struct BookingSuccessTemplate {
    service_name: String,
    date: String,
    time_slot: String,
    price_label: String,
    is_free_wash: bool,
    visits: u32,
}

#[derive(Clone, Debug)]
struct HistoryRow {
    service_name: String,
    date: String,
    time_slot: String,
    status_label: String,
    status_class: String,
    plate: String,
    price_label: String,
    is_free: bool,
}

#[derive(Template)]
#[template(path = "history.html")]
struct HistoryTemplate {
    rows: Vec<HistoryRow>,
    has_rows: bool,
}

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate {
    name: String,
    phone: String,
    plate: String,
    visits: u32,
    remaining: u32,
    progress_percent: u32,
    is_vip: bool,
    saved: bool,
}

#[derive(Deserialize)]
struct BookQuery {
    service: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct BookingForm {
    service_id: String,
    date: String,
    time_slot: Option<String>,
    name: String,
    phone: String,
    plate: String,
}

#[derive(Deserialize)]
struct ProfileForm {
    name: String,
    phone: String,
    plate: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(
            web::resource("/book")
                .route(web::get().to(show_booking))
                .route(web::post().to(create_booking)),
        )
        .service(web::resource("/history").route(web::get().to(history)))
        .service(
            web::resource("/profile")
                .route(web::get().to(show_profile))
                .route(web::post().to(save_profile)),
        )
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

fn service_cards(selected: &str) -> Vec<ServiceCard> {
    service_catalog()
        .iter()
        .map(|service| ServiceCard {
            id: service.id.to_string(),
            name: service.name.to_string(),
            description: service.description.to_string(),
            price_label: format_price(service.price),
            duration_label: format!("{} min", service.duration_minutes),
            selected: service.id == selected,
        })
        .collect()
}

async fn home(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    let user = identity::current_user(&req);
    let client = repo::resolve_client(&state.db, &user)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
    let loyalty = loyalty_status(client.visits, LOYALTY_THRESHOLD);

    Ok(render(HomeTemplate {
        name: client.name,
        visits: client.visits,
        remaining: loyalty.remaining,
        free_next: loyalty.free_on_next_visit,
        services: service_cards(""),
    }))
}

async fn booking_page(
    pool: &SqlitePool,
    client: &Client,
    service_id: &str,
    date: NaiveDate,
    form: BookingFormView,
    errors: Vec<String>,
) -> Result<BookTemplate, sqlx::Error> {
    let settings = repo::get_settings(pool).await?;
    let bookings = repo::get_bookings(pool).await?;
    let active = active_on_date(&bookings, date);
    let slots = compute_slots(&settings, &active);
    let loyalty = loyalty_status(client.visits, LOYALTY_THRESHOLD);

    Ok(BookTemplate {
        services: service_cards(service_id),
        selected_service: service_id.to_string(),
        date: date.to_string(),
        today: Utc::now().date_naive().to_string(),
        has_slots: !slots.is_empty(),
        slots,
        posts_count: settings.posts_count,
        free_next: loyalty.free_on_next_visit,
        form,
        errors,
    })
}

async fn show_booking(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<BookQuery>,
) -> Result<HttpResponse> {
    let user = identity::current_user(&req);
    let client = repo::resolve_client(&state.db, &user)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    let date = query
        .date
        .as_deref()
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(|| Utc::now().date_naive());
    let service_id = query.service.clone().unwrap_or_default();

    let form = BookingFormView {
        name: client.name.clone(),
        phone: client.phone.clone(),
        plate: client.plate_number.clone(),
    };
    let page = booking_page(&state.db, &client, &service_id, date, form, Vec::new())
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(render(page))
}

async fn create_booking(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<BookingForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let user = identity::current_user(&req);
    let client = repo::resolve_client(&state.db, &user)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    let service = find_service(&form.service_id);
    let date: Option<NaiveDate> = form.date.parse().ok();
    let time_slot = form.time_slot.unwrap_or_default();

    let mut errors = Vec::new();
    if service.is_none() {
        errors.push("Please select a service.".to_string());
    }
    if date.is_none() {
        errors.push("Please pick a valid date.".to_string());
    }
    if time_slot.trim().is_empty() {
        errors.push("Please pick a time slot.".to_string());
    }
    if form.name.trim().is_empty() {
        errors.push("Your name is required.".to_string());
    }
    if form.phone.trim().is_empty() {
        errors.push("A phone number is required.".to_string());
    }
    if form.plate.trim().is_empty() {
        errors.push("A plate number is required.".to_string());
    }

    if !errors.is_empty() {
        let page = booking_page(
            &state.db,
            &client,
            &form.service_id,
            date.unwrap_or_else(|| Utc::now().date_naive()),
            BookingFormView {
                name: form.name,
                phone: form.phone,
                plate: form.plate,
            },
            errors,
        )
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
        return Ok(render(page));
    }

    let (Some(service), Some(date)) = (service, date) else {
        return Ok(HttpResponse::BadRequest().finish());
    };
    let contact = ContactInfo {
        name: form.name.trim().to_string(),
        phone: form.phone.trim().to_string(),
        plate_number: form.plate.trim().to_string(),
    };

    let outcome = booking::create_booking(&state.db, &client, service, date, &time_slot, &contact)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    let settings = repo::get_settings(&state.db)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
    notify::notify_booking_created(&settings, &outcome.booking, service, &outcome.client.name).await;

    let price_label = if outcome.booking.is_free_wash {
        "Free".to_string()
    } else {
        format_price(service.price)
    };
    Ok(render(BookingSuccessTemplate {
        service_name: service.name.to_string(),
        date: outcome.booking.date.to_string(),
        time_slot: outcome.booking.time_slot.clone(),
        price_label,
        is_free_wash: outcome.booking.is_free_wash,
        visits: outcome.client.visits,
    }))
}

async fn history(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    let user = identity::current_user(&req);
    let client = repo::resolve_client(&state.db, &user)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
    let bookings = repo::user_bookings(&state.db, &client)
        .await
        .unwrap_or_default();

    let rows: Vec<HistoryRow> = bookings.iter().map(history_row).collect();
    Ok(render(HistoryTemplate {
        has_rows: !rows.is_empty(),
        rows,
    }))
}

fn history_row(booking: &Booking) -> HistoryRow {
    let service = find_service(&booking.service_id);
    let service_name = service
        .map(|s| s.name.to_string())
        .unwrap_or_else(|| "Unknown service".to_string());
    let price_label = if booking.is_free_wash {
        "Free".to_string()
    } else {
        service.map(|s| format_price(s.price)).unwrap_or_default()
    };
    HistoryRow {
        service_name,
        date: booking.date.to_string(),
        time_slot: booking.time_slot.clone(),
        status_label: booking.status.label().to_string(),
        status_class: booking.status.css_class().to_string(),
        plate: booking.plate_number.clone(),
        price_label,
        is_free: booking.is_free_wash,
    }
}

fn profile_page(client: &Client, saved: bool) -> ProfileTemplate {
    let loyalty = loyalty_status(client.visits, LOYALTY_THRESHOLD);
    ProfileTemplate {
        name: client.name.clone(),
        phone: client.phone.clone(),
        plate: client.plate_number.clone(),
        visits: client.visits,
        remaining: loyalty.remaining,
        progress_percent: loyalty.progress_percent,
        is_vip: client.is_vip,
        saved,
    }
}

async fn show_profile(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    let user = identity::current_user(&req);
    let client = repo::resolve_client(&state.db, &user)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(render(profile_page(&client, false)))
}

async fn save_profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<ProfileForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let user = identity::current_user(&req);
    let mut client = repo::resolve_client(&state.db, &user)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    client.name = form.name.trim().to_string();
    client.phone = form.phone.trim().to_string();
    client.plate_number = form.plate.trim().to_string();
    repo::save_client(&state.db, &client)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    let client = repo::resolve_client(&state.db, &user)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(render(profile_page(&client, true)))
}
