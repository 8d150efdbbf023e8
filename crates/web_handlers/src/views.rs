//! Server-rendered HTML pages.
//!
//! Deliberately thin: a shared layout, escaped interpolation, and one
//! function per page. All user-supplied text passes through [`escape`].

use actix_web::HttpResponse;

use auth_services::session::{Flash, FlashLevel};
use auth_services::types::{SessionUser, User};

use crate::types::{Campground, Comment};

/// Per-request rendering context: who is signed in, and the drained flashes.
pub struct PageContext {
    /// The signed-in user, if any
    pub current_user: Option<SessionUser>,
    /// Flash messages drained from the session for this render
    pub flashes: Vec<Flash>,
}

impl PageContext {
    /// Builds the context for one render, draining the pending flashes.
    pub fn from_session(session: &auth_services::session::SessionContext) -> Self {
        Self {
            current_user: session.current_user(),
            flashes: session.take_flash(),
        }
    }
}

/// Escapes text for safe interpolation into HTML.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn nav(ctx: &PageContext) -> String {
    match &ctx.current_user {
        Some(user) => format!(
            r#"<nav><a href="/campgrounds">YonderCamp</a> <span>Signed in as <a href="/users/{id}">{name}</a></span> <a href="/logout">Logout</a></nav>"#,
            id = user.id,
            name = escape(&user.username),
        ),
        None => r#"<nav><a href="/campgrounds">YonderCamp</a> <a href="/login">Login</a> <a href="/register">Sign Up</a></nav>"#
            .to_string(),
    }
}

fn flashes(ctx: &PageContext) -> String {
    ctx.flashes
        .iter()
        .map(|flash| {
            let class = match flash.level {
                FlashLevel::Error => "flash flash-error",
                FlashLevel::Success => "flash flash-success",
            };
            format!(
                r#"<div class="{class}">{}</div>"#,
                escape(&flash.message)
            )
        })
        .collect()
}

fn layout(title: &str, ctx: &PageContext, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | YonderCamp</title>
<link rel="stylesheet" href="/static/main.css">
</head>
<body>
{nav}
{flashes}
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav(ctx),
        flashes = flashes(ctx),
    )
}

fn page(title: &str, ctx: &PageContext, body: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(layout(title, ctx, body))
}

/// Landing page.
pub fn landing(ctx: &PageContext) -> HttpResponse {
    page(
        "Welcome",
        ctx,
        r#"<h1>Welcome to YonderCamp!</h1>
<p>Share and review the best places to pitch a tent.</p>
<a href="/campgrounds">View all campgrounds</a>"#,
    )
}

/// Campground index with optional search annotation.
pub fn campground_index(
    ctx: &PageContext,
    campgrounds: &[Campground],
    search: Option<&str>,
    no_match: Option<&str>,
) -> HttpResponse {
    let mut body = String::from("<h1>Campgrounds</h1>\n");
    body.push_str(&format!(
        r#"<form method="get" action="/campgrounds"><input type="text" name="search" placeholder="Campground search..." value="{}"><button type="submit">Search</button></form>"#,
        escape(search.unwrap_or("")),
    ));
    if let Some(message) = no_match {
        body.push_str(&format!("<p class=\"no-match\">{}</p>\n", escape(message)));
    }
    body.push_str("<ul class=\"campgrounds\">\n");
    for campground in campgrounds {
        body.push_str(&format!(
            r#"<li><a href="/campgrounds/{id}"><img src="{image}" alt="{name}">{name}</a></li>
"#,
            id = campground.id,
            image = escape(&campground.image_url),
            name = escape(&campground.name),
        ));
    }
    body.push_str("</ul>\n");
    if ctx.current_user.is_some() {
        body.push_str(r#"<a href="/campgrounds/new">Add new campground</a>"#);
    }
    page("Campgrounds", ctx, &body)
}

/// Create/edit form for a campground. `existing` pre-fills the fields and
/// makes the image optional.
pub fn campground_form(
    ctx: &PageContext,
    heading: &str,
    action: &str,
    existing: Option<&Campground>,
) -> HttpResponse {
    let (name, price, description) = match existing {
        Some(c) => (escape(&c.name), c.price.to_string(), escape(&c.description)),
        None => (String::new(), String::new(), String::new()),
    };
    let body = format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}" enctype="multipart/form-data">
<label>Name <input type="text" name="name" value="{name}" required></label>
<label>Price <input type="number" name="price" step="0.01" min="0" value="{price}" required></label>
<label>Description <textarea name="description">{description}</textarea></label>
<label>Image <input type="file" name="image" accept="image/*"></label>
<button type="submit">Submit</button>
</form>"#,
        heading = escape(heading),
        action = escape(action),
    );
    page(heading, ctx, &body)
}

/// Campground show page with its comments.
pub fn campground_show(
    ctx: &PageContext,
    campground: &Campground,
    comments: &[Comment],
) -> HttpResponse {
    let mut body = format!(
        r#"<h1>{name}</h1>
<img src="{image}" alt="{name}">
<p class="price">${price:.2}/night</p>
<p>{description}</p>
<p>Submitted by <a href="/users/{author_id}">{author}</a></p>
"#,
        name = escape(&campground.name),
        image = escape(&campground.image_url),
        price = campground.price,
        description = escape(&campground.description),
        author_id = campground.author.id,
        author = escape(&campground.author.username),
    );

    if can_modify(ctx, campground.author.id) {
        body.push_str(&format!(
            r#"<a href="/campgrounds/{id}/edit">Edit</a>
<form method="post" action="/campgrounds/{id}?_method=DELETE"><button type="submit">Delete</button></form>
"#,
            id = campground.id,
        ));
    }

    body.push_str("<section id=\"comments\">\n<h2>Comments</h2>\n");
    if ctx.current_user.is_some() {
        body.push_str(&format!(
            r#"<form method="post" action="/campgrounds/{id}/comments"><textarea name="body" required></textarea><button type="submit">Add comment</button></form>
"#,
            id = campground.id,
        ));
    }
    for comment in comments {
        body.push_str(&format!(
            r#"<article class="comment"><img src="{avatar}" alt="{author}"><strong>{author}</strong><p>{text}</p>"#,
            avatar = escape(&comment.author.avatar),
            author = escape(&comment.author.username),
            text = escape(&comment.body),
        ));
        if can_modify(ctx, comment.author.id) {
            body.push_str(&format!(
                r#"<form method="post" action="/campgrounds/{cid}/comments/{id}?_method=PUT"><input type="text" name="body" value="{text}"><button type="submit">Update</button></form>
<form method="post" action="/campgrounds/{cid}/comments/{id}?_method=DELETE"><button type="submit">Delete</button></form>"#,
                cid = campground.id,
                id = comment.id,
                text = escape(&comment.body),
            ));
        }
        body.push_str("</article>\n");
    }
    body.push_str("</section>");

    page(&campground.name, ctx, &body)
}

/// Registration form; `prefill` keeps what the user typed after a failure.
pub fn register_form(ctx: &PageContext, prefill_username: &str) -> HttpResponse {
    let body = format!(
        r#"<h1>Sign Up</h1>
<form method="post" action="/register">
<label>Username <input type="text" name="username" value="{username}" required></label>
<label>Password <input type="password" name="password" required></label>
<label>First name <input type="text" name="first_name"></label>
<label>Last name <input type="text" name="last_name"></label>
<label>Email <input type="email" name="email"></label>
<label>Avatar URL <input type="url" name="avatar"></label>
<label>About you <textarea name="description"></textarea></label>
<label>Admin code <input type="text" name="admin_code"></label>
<button type="submit">Sign Up</button>
</form>"#,
        username = escape(prefill_username),
    );
    page("Sign Up", ctx, &body)
}

/// Login form.
pub fn login_form(ctx: &PageContext) -> HttpResponse {
    page(
        "Login",
        ctx,
        r#"<h1>Login</h1>
<form method="post" action="/login">
<label>Username <input type="text" name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Login</button>
</form>"#,
    )
}

/// User profile with their authored campgrounds.
pub fn user_show(ctx: &PageContext, user: &User, campgrounds: &[Campground]) -> HttpResponse {
    let mut body = format!(
        r#"<h1>{username}</h1>
<img src="{avatar}" alt="{username}">
<p>{first} {last}</p>
<p>{email}</p>
<p>{description}</p>
"#,
        username = escape(&user.username),
        avatar = escape(&user.avatar),
        first = escape(&user.first_name),
        last = escape(&user.last_name),
        email = escape(&user.email),
        description = escape(&user.description),
    );
    if can_modify(ctx, user.id) {
        body.push_str(&format!(
            "<a href=\"/users/{}/edit\">Edit profile</a>\n",
            user.id
        ));
    }
    body.push_str(&format!(
        "<h2>{}'s campgrounds</h2>\n<ul>\n",
        escape(&user.username)
    ));
    for campground in campgrounds {
        body.push_str(&format!(
            "<li><a href=\"/campgrounds/{}\">{}</a></li>\n",
            campground.id,
            escape(&campground.name)
        ));
    }
    body.push_str("</ul>");
    page(&user.username, ctx, &body)
}

/// Profile edit form.
pub fn user_edit(ctx: &PageContext, user: &User) -> HttpResponse {
    let body = format!(
        r#"<h1>Edit your profile</h1>
<form method="post" action="/users/{id}?_method=PUT">
<label>First name <input type="text" name="first_name" value="{first}"></label>
<label>Last name <input type="text" name="last_name" value="{last}"></label>
<label>Email <input type="email" name="email" value="{email}"></label>
<label>Avatar URL <input type="url" name="avatar" value="{avatar}"></label>
<label>About you <textarea name="description">{description}</textarea></label>
<button type="submit">Save</button>
</form>"#,
        id = user.id,
        first = escape(&user.first_name),
        last = escape(&user.last_name),
        email = escape(&user.email),
        avatar = escape(&user.avatar),
        description = escape(&user.description),
    );
    page("Edit profile", ctx, &body)
}

fn can_modify(ctx: &PageContext, owner_id: uuid::Uuid) -> bool {
    ctx.current_user
        .as_ref()
        .is_some_and(|user| user.id == owner_id || user.is_admin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("hi")</script>"#),
            "&lt;script&gt;alert(&quot;hi&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("Tom & Jerry's"), "Tom &amp; Jerry&#39;s");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_layout_renders_flashes_once() {
        let ctx = PageContext {
            current_user: None,
            flashes: vec![Flash {
                level: FlashLevel::Error,
                message: "Campground not found".to_string(),
            }],
        };
        let html = layout("Test", &ctx, "<p>body</p>");
        assert!(html.contains("flash-error"));
        assert!(html.contains("Campground not found"));
        assert!(html.contains("<p>body</p>"));
    }
}
