//! Server-rendered HTML pages
//!
//! Pages are built with `maud`, so every interpolated value is escaped.

use maud::{html, Markup, DOCTYPE};

use crate::models::{Anime, Pagination};

fn layout(title: &str, authenticated: bool, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Anime Catalog" }
            }
            body {
                header {
                    nav {
                        a href="/" { "Anime Catalog" }
                        " | "
                        a href="/form" { "Add anime" }
                        " | "
                        @if authenticated {
                            a href="/logout" { "Log out" }
                        } @else {
                            a href="/api/login" { "Log in" }
                        }
                    }
                }
                main { (content) }
            }
        }
    }
}

fn page_link(base_path: &str, page: &Pagination) -> String {
    format!(
        "{}?offset={}&limit={}",
        base_path, page.page, page.per_page
    )
}

/// Paginated anime table
///
/// `base_path` is the route the pagination links point back to; `total` is
/// the number of anime in the whole catalog.
pub fn anime_index(
    records: &[Anime],
    page: &Pagination,
    total: i64,
    base_path: &str,
    authenticated: bool,
) -> Markup {
    let has_next = page.offset() + (records.len() as i64) < total;
    let content = html! {
        h1 { "Anime" }
        @if authenticated {
            p.status { "You are signed in." }
        }
        @if records.is_empty() {
            p { "No anime on this page." }
        } @else {
            table {
                thead {
                    tr {
                        th { "ID" }
                        th { "Name" }
                        th { "Genre" }
                        th { "Type" }
                        th { "Episodes" }
                        th { "Rating" }
                        th { "Members" }
                    }
                }
                tbody {
                    @for anime in records {
                        tr {
                            td { (anime.anime_id) }
                            td { a href=(format!("/anime/{}", anime.anime_id)) { (anime.name) } }
                            td { (anime.genre) }
                            td { (anime.anime_type) }
                            td { (anime.episodes) }
                            td { (anime.rating) }
                            td { (anime.members) }
                        }
                    }
                }
            }
        }
        nav.pagination {
            @if let Some(previous) = page.previous() {
                a rel="prev" href=(page_link(base_path, &previous)) { "Previous" }
                " "
            }
            span { "Page " (page.page) }
            @if has_next {
                " "
                a rel="next" href=(page_link(base_path, &page.next())) { "Next" }
            }
        }
    };

    layout("Anime", authenticated, content)
}

/// Single anime page
pub fn anime_detail(anime: &Anime, authenticated: bool) -> Markup {
    let content = html! {
        h1 { (anime.name) }
        dl {
            dt { "ID" } dd { (anime.anime_id) }
            dt { "Genre" } dd { (anime.genre) }
            dt { "Type" } dd { (anime.anime_type) }
            dt { "Episodes" } dd { (anime.episodes) }
            dt { "Rating" } dd { (anime.rating) }
            dt { "Members" } dd { (anime.members) }
            dt { "Added" } dd { (anime.date_created.format("%Y-%m-%d %H:%M")) }
        }
        p { a href="/" { "Back to the list" } }
    };

    layout(&anime.name, authenticated, content)
}

/// Login form, optionally showing why the previous attempt failed
pub fn login_page(error: Option<&str>) -> Markup {
    let content = html! {
        h1 { "Log in" }
        @if let Some(message) = error {
            p.error role="alert" { (message) }
        }
        form method="post" action="/api/login" {
            p {
                label for="username" { "Username" }
                input id="username" name="username" type="text" required autocomplete="username";
            }
            p {
                label for="password" { "Password" }
                input id="password" name="password" type="password" required autocomplete="current-password";
            }
            button type="submit" { "Log in" }
        }
    };

    layout("Log in", false, content)
}

/// Form for adding a single anime
pub fn anime_form_page(authenticated: bool) -> Markup {
    let field = |name: &str, label: &str| {
        html! {
            p {
                label for=(name) { (label) }
                input id=(name) name=(name) type="text";
            }
        }
    };

    let content = html! {
        h1 { "Add anime" }
        form method="post" action="/add_by_form" {
            p {
                label for="anime_id" { "ID" }
                input id="anime_id" name="anime_id" type="number" required;
            }
            (field("name", "Name"))
            (field("genre", "Genre"))
            (field("anime_type", "Type"))
            (field("episodes", "Episodes"))
            (field("rating", "Rating"))
            (field("members", "Members"))
            button type="submit" { "Save" }
        }
    };

    layout("Add anime", authenticated, content)
}
