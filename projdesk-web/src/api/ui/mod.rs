//! HTML pages
//!
//! Pages are rendered with `format!` into a shared layout. Every value that
//! came from the CRM or the request goes through [`escape_html`]; ids placed
//! in URL paths are percent-encoded first with [`path_segment`].
//!
//! - **Listing** (`index_page`): projects with their contacts
//! - **Edit form** (`update_form_page`): create or update a project
//! - **Add contact** (`add_contact_page`): pick contacts for a project
//! - **Error** (`error_page`): static message, no detail

use crate::services::{CandidateContact, EditContext, ProjectView};
use axum::http::StatusCode;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write;

/// Bytes that may not appear raw inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode `id` for use as one URL path segment in an attribute
pub fn path_segment(id: &str) -> String {
    escape_html(&utf8_percent_encode(id, PATH_SEGMENT).to_string())
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/public/css/style.css">
</head>
<body>
    <header>
        <h1><a href="/">Projects</a></h1>
    </header>
    <main>
{body}
    </main>
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

/// GET / body
pub fn index_page(projects: &[ProjectView]) -> String {
    let mut body = String::from(
        "        <p><a class=\"button\" href=\"/update-cobj\">New project</a></p>\n",
    );

    if projects.is_empty() {
        body.push_str("        <p class=\"empty\">No projects yet.</p>\n");
        return layout("Projects", &body);
    }

    body.push_str(
        "        <table class=\"projects\">\n\
         \x20           <thead><tr><th>Name</th><th>Description</th><th>Status</th><th>Contacts</th><th></th></tr></thead>\n\
         \x20           <tbody>\n",
    );

    for view in projects {
        let project = &view.project;
        let id = escape_html(&project.id);
        let path_id = path_segment(&project.id);

        let contacts = if view.contacts.is_empty() {
            "<span class=\"empty\">None</span>".to_string()
        } else {
            let mut list = String::from("<ul>");
            for contact in &view.contacts {
                let _ = write!(
                    list,
                    "<li data-contact-id=\"{}\">{} {}</li>",
                    escape_html(&contact.id),
                    escape_html(&contact.firstname),
                    escape_html(&contact.lastname)
                );
            }
            list.push_str("</ul>");
            list
        };

        let _ = writeln!(
            body,
            r#"                <tr data-project-id="{id}">
                    <td>{name}</td>
                    <td>{description}</td>
                    <td>{status}</td>
                    <td>{contacts}</td>
                    <td class="actions">
                        <a href="/update-cobj/{path_id}">Edit</a>
                        <a href="/add-contact/{path_id}">Add contact</a>
                        <form method="post" action="/delete-cobj/{path_id}"><button type="submit">Delete</button></form>
                    </td>
                </tr>"#,
            id = id,
            path_id = path_id,
            name = escape_html(&project.name),
            description = escape_html(&project.description),
            status = escape_html(&project.status),
            contacts = contacts,
        );
    }

    body.push_str("            </tbody>\n        </table>\n");
    layout("Projects", &body)
}

/// GET /update-cobj/:id? body
pub fn update_form_page(context: &EditContext) -> String {
    let (title, action, name, description, status) = match context {
        EditContext::New => (
            "New project".to_string(),
            "/update-cobj".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ),
        EditContext::Loaded(project) => (
            format!("Edit {}", project.name),
            format!("/update-cobj/{}", path_segment(&project.id)),
            escape_html(&project.name),
            escape_html(&project.description),
            escape_html(&project.status),
        ),
    };

    let body = format!(
        r#"        <h2>{heading}</h2>
        <form method="post" action="{action}" class="project-form">
            <label for="name">Name</label>
            <input type="text" id="name" name="name" value="{name}">
            <label for="description">Description</label>
            <textarea id="description" name="description">{description}</textarea>
            <label for="status">Status</label>
            <input type="text" id="status" name="status" value="{status}">
            <button type="submit">Save</button>
            <a href="/">Cancel</a>
        </form>
"#,
        heading = escape_html(&title),
        action = action,
        name = name,
        description = description,
        status = status,
    );

    layout(&title, &body)
}

/// GET /add-contact/:projectId body
pub fn add_contact_page(project_id: &str, candidates: &[CandidateContact]) -> String {
    let project_id = path_segment(project_id);
    let mut body = String::from("        <h2>Add contacts</h2>\n");

    if candidates.is_empty() {
        body.push_str("        <p class=\"empty\">No contacts available.</p>\n");
        body.push_str("        <p><a href=\"/\">Back</a></p>\n");
        return layout("Add contacts", &body);
    }

    let _ = writeln!(
        body,
        "        <form method=\"post\" action=\"/add-contact/{}\" class=\"contact-form\">",
        project_id
    );
    for contact in candidates {
        let email = contact
            .email
            .as_deref()
            .map(|e| format!(" &lt;{}&gt;", escape_html(e)))
            .unwrap_or_default();
        let _ = writeln!(
            body,
            "            <label><input type=\"checkbox\" name=\"contactIds\" value=\"{}\"> {} {}{}</label>",
            escape_html(&contact.id),
            escape_html(&contact.firstname),
            escape_html(&contact.lastname),
            email
        );
    }
    body.push_str(
        "            <button type=\"submit\">Add</button>\n\
         \x20           <a href=\"/\">Cancel</a>\n\
         \x20       </form>\n",
    );

    layout("Add contacts", &body)
}

/// Error body: status line plus the static message
pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "        <h2>{}</h2>\n        <p class=\"error\">{}</p>\n        <p><a href=\"/\">Back to projects</a></p>\n",
        status.as_u16(),
        escape_html(message)
    );
    layout("Error", &body)
}
