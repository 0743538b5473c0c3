//! Server-rendered HTML pages.

use drop_types::{short_address, Address, Collection, MintAvailability, MintStatus};
use std::fmt::Write;
use url::Url;

use crate::notify::{Toast, ToastKind};

/// Escapes text for HTML element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `/nft/{slug}` with the slug percent-encoded as a single path segment.
pub fn detail_path(slug: &str) -> String {
    let Ok(mut url) = Url::parse("http://storefront.local/nft") else {
        return "/".to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(slug);
    }
    url.path().to_string()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{}</title>\n<link rel=\"icon\" href=\"/favicon.ico\">\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

fn brand_heading(brand: &str) -> String {
    format!(
        "<h1 class=\"brand\">The <span class=\"brand-name\">{}</span> NFT Market Place</h1>",
        escape(brand)
    )
}

/// One gallery card.
pub struct CollectionCard {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub preview_url: Option<String>,
}

pub fn gallery(brand: &str, cards: &[CollectionCard]) -> String {
    let mut grid = String::new();
    for card in cards {
        let image = card
            .preview_url
            .as_deref()
            .map(|url| format!("<img class=\"preview\" src=\"{}\" alt=\"{}\">", escape(url), escape(&card.title)))
            .unwrap_or_default();
        let _ = write!(
            grid,
            "<a class=\"card\" href=\"{}\">{image}<div><h2>{}</h2><p>{}</p></div></a>\n",
            detail_path(&card.slug),
            escape(&card.title),
            escape(&card.description),
        );
    }
    if cards.is_empty() {
        grid.push_str("<p class=\"empty\">No collections yet.</p>");
    }
    let body = format!(
        "<div class=\"gallery\">{}\n<main><div class=\"grid\">\n{grid}</div></main></div>",
        brand_heading(brand)
    );
    layout(&format!("{brand} NFT Market Place"), &body)
}

/// Everything the detail page shows.
pub struct DetailView<'a> {
    pub brand: &'a str,
    pub collection: &'a Collection,
    pub main_image_url: Option<String>,
    pub preview_image_url: Option<String>,
    pub wallet: Option<Address>,
    pub status: &'a MintStatus,
    pub availability: MintAvailability,
    /// Contract could not be resolved or read.
    pub unavailable: bool,
    pub toasts: &'a [Toast],
}

fn toast_class(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Pending => "toast toast-pending",
        ToastKind::Success => "toast toast-success",
        ToastKind::Error => "toast toast-error",
    }
}

fn render_toasts(toasts: &[Toast]) -> String {
    let mut out = String::new();
    for toast in toasts {
        let duration = toast
            .duration_ms
            .map(|ms| format!(" data-duration-ms=\"{ms}\""))
            .unwrap_or_default();
        let _ = write!(
            out,
            "<div class=\"{}\" role=\"status\"{duration}>{}</div>",
            toast_class(toast.kind),
            escape(&toast.message)
        );
    }
    out
}

pub fn supply_line(status: &MintStatus, unavailable: bool) -> String {
    if unavailable {
        return "Minting is currently unavailable".to_string();
    }
    match (status.loading, status.total) {
        (false, Some(total)) => format!("{} / {total} NFT's claimed", status.claimed),
        _ => "Loading Supply Count...".to_string(),
    }
}

pub fn detail(view: &DetailView<'_>) -> String {
    let collection = view.collection;
    let here = detail_path(collection.slug());

    let session = match &view.wallet {
        Some(_) => format!(
            "<form method=\"post\" action=\"/wallet/disconnect\"><input type=\"hidden\" name=\"return_to\" value=\"{here}\"><button class=\"session\">Sign Out</button></form>"
        ),
        None => format!(
            "<form method=\"post\" action=\"/wallet/connect\"><input type=\"hidden\" name=\"return_to\" value=\"{here}\"><button class=\"session\">Sign In</button></form>"
        ),
    };
    let banner = view
        .wallet
        .map(|addr| {
            format!(
                "<p class=\"wallet\">You're logged in with wallet {}</p>",
                escape(&short_address(&addr))
            )
        })
        .unwrap_or_default();

    let image = |url: &Option<String>, class: &str| {
        url.as_deref()
            .map(|u| format!("<img class=\"{class}\" src=\"{}\" alt=\"\">", escape(u)))
            .unwrap_or_default()
    };

    let disabled = if view.availability.is_enabled() {
        ""
    } else {
        " disabled"
    };

    let body = format!(
        "<div class=\"drop\">\n\
<aside class=\"series\">{preview}<h1>{series}</h1><h2>{description}</h2></aside>\n\
<section class=\"mint\">\n\
<header><a href=\"/\">{heading}</a>{session}</header>\n<hr>\n{banner}\n\
<div class=\"toasts\">{toasts}</div>\n\
<div class=\"content\">{main}<h1>{title}</h1><p class=\"supply\">{supply}</p></div>\n\
<form method=\"post\" action=\"{here}/mint\"><button class=\"mint-button\"{disabled}>{label}</button></form>\n\
</section>\n</div>",
        preview = image(&view.preview_image_url, "preview"),
        series = escape(&collection.nft_collection_name),
        description = escape(&collection.description),
        heading = brand_heading(view.brand),
        toasts = render_toasts(view.toasts),
        main = image(&view.main_image_url, "main"),
        title = escape(&collection.title),
        supply = supply_line(view.status, view.unavailable),
        label = escape(&view.availability.label()),
    );
    layout(&collection.title, &body)
}

pub fn not_found(brand: &str, slug: &str) -> String {
    let body = format!(
        "<div class=\"not-found\">{}<h2>404 - Collection not found</h2><p>No collection named \"{}\".</p><a href=\"/\">Back to the gallery</a></div>",
        brand_heading(brand),
        escape(slug)
    );
    layout("Not Found", &body)
}

pub fn error_page(brand: &str, message: &str) -> String {
    let body = format!(
        "<div class=\"error\">{}<h2>Something went wrong</h2><p>{}</p><a href=\"/\">Back to the gallery</a></div>",
        brand_heading(brand),
        escape(message)
    );
    layout("Error", &body)
}
