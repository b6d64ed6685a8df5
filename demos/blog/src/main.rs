use std::collections::BTreeMap;

use quill::prelude::*;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// Board types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
struct Comment {
    author: String,
    body: String,
}

#[derive(Debug, Clone, Serialize)]
struct Post {
    id: u64,
    title: String,
    body: String,
    author: String,
    comments: Vec<Comment>,
}

#[derive(Default)]
struct Board {
    posts: BTreeMap<u64, Post>,
    next_id: u64,
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

enum Route {
    Index,
    ShowPost(u64),
    Register { name: String, email: String, password: String },
    Login { email: String, password: String },
    Logout,
    Comment { post_id: u64, body: String },
    NewPost { title: String, body: String },
    EditPost { post_id: u64, title: String, body: String },
    DeletePost(u64),
}

impl Route {
    fn requirement(&self) -> AuthorizationRequirement {
        match self {
            Self::Index
            | Self::ShowPost(_)
            | Self::Register { .. }
            | Self::Login { .. }
            | Self::Logout => AuthorizationRequirement::Public,
            Self::Comment { .. } | Self::NewPost { .. } => {
                AuthorizationRequirement::AuthenticatedOnly
            }
            Self::EditPost { .. } | Self::DeletePost(_) => AuthorizationRequirement::AdminOnly,
        }
    }

    fn path(&self) -> String {
        match self {
            Self::Index => "/".into(),
            Self::ShowPost(id) | Self::Comment { post_id: id, .. } => format!("/post/{id}"),
            Self::Register { .. } => "/register".into(),
            Self::Login { .. } => "/login".into(),
            Self::Logout => "/logout".into(),
            Self::NewPost { .. } => "/new-post".into(),
            Self::EditPost { post_id, .. } => format!("/edit-post/{post_id}"),
            Self::DeletePost(id) => format!("/delete/{id}"),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Response {
    Page { logged_in: bool, body: serde_json::Value },
    Redirect { location: String, flash: Option<String> },
    Error { status: u16, message: String },
}

impl Response {
    fn redirect(location: &str, flash: impl Into<String>) -> Self {
        Self::Redirect { location: location.into(), flash: Some(flash.into()) }
    }

    fn not_found() -> Self {
        Self::Error { status: 404, message: "Post not found".into() }
    }

    fn from_error(err: &AuthError, path: &str) -> Self {
        match err.rejection(Some(path)) {
            Some(rejection) => match rejection.location() {
                Some(location) => Self::Redirect { location, flash: Some(err.user_message()) },
                None => Self::Error { status: rejection.status_code(), message: err.user_message() },
            },
            None if err.is_recoverable() => Self::Error { status: 400, message: err.user_message() },
            None => {
                tracing::error!(error = %err, path, "request failed");
                Self::Error { status: 500, message: err.user_message() }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

struct Blog {
    auth: AuthService<MemoryCredentialStore>,
    board: Mutex<Board>,
}

impl Blog {
    fn new(config: QuillConfig) -> Result<Self, AuthError> {
        Ok(Self { auth: AuthService::in_memory(config)?, board: Mutex::new(Board::default()) })
    }

    async fn handle(&self, ctx: &mut RequestContext, route: Route) -> Response {
        let path = route.path();
        let who = match self.auth.require(ctx, route.requirement()).await {
            Ok(who) => who,
            Err(err) => return Response::from_error(&err, &path),
        };

        match route {
            Route::Index => {
                let board = self.board.lock().await;
                let titles: Vec<_> = board
                    .posts
                    .values()
                    .map(|p| json!({ "id": p.id, "title": p.title }))
                    .collect();
                Response::Page { logged_in: who.is_some(), body: json!(titles) }
            }
            Route::ShowPost(id) => match self.board.lock().await.posts.get(&id) {
                Some(post) => Response::Page { logged_in: who.is_some(), body: json!(post) },
                None => Response::not_found(),
            },
            Route::Register { name, email, password } => {
                match self.auth.register(ctx, &name, &email, &password).await {
                    Ok(_) => Response::redirect("/", format!("Hello {name} ! thanks for signing in.")),
                    Err(AuthError::DuplicateEmail) => {
                        Response::redirect("/login", AuthError::DuplicateEmail.user_message())
                    }
                    Err(err) => Response::from_error(&err, &path),
                }
            }
            Route::Login { email, password } => {
                match self.auth.login(ctx, &email, &password).await {
                    Ok(_) => Response::redirect("/", "You were successfully logged in"),
                    Err(err) if err.is_recoverable() => Response::redirect("/login", err.user_message()),
                    Err(err) => Response::from_error(&err, &path),
                }
            }
            Route::Logout => {
                self.auth.logout(ctx).await;
                Response::Redirect { location: "/".into(), flash: None }
            }
            Route::Comment { post_id, body } => {
                let Some(author) = who else { return Response::not_found() };
                let mut board = self.board.lock().await;
                let Some(post) = board.posts.get_mut(&post_id) else { return Response::not_found() };
                post.comments.push(Comment { author: author.name, body });
                Response::Redirect { location: path, flash: None }
            }
            Route::NewPost { title, body } => {
                let Some(author) = who else { return Response::not_found() };
                let mut board = self.board.lock().await;
                board.next_id += 1;
                let id = board.next_id;
                board.posts.insert(id, Post { id, title, body, author: author.name, comments: Vec::new() });
                tracing::info!(post_id = id, user_id = %author.id, "post created");
                Response::Redirect { location: "/".into(), flash: None }
            }
            Route::EditPost { post_id, title, body } => {
                let mut board = self.board.lock().await;
                let Some(post) = board.posts.get_mut(&post_id) else { return Response::not_found() };
                post.title = title;
                post.body = body;
                Response::Redirect { location: format!("/post/{post_id}"), flash: None }
            }
            Route::DeletePost(id) => match self.board.lock().await.posts.remove(&id) {
                Some(_) => Response::Redirect { location: "/".into(), flash: None },
                None => Response::not_found(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

fn register(name: &str, email: &str, password: &str) -> Route {
    Route::Register { name: name.into(), email: email.into(), password: password.into() }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    quill::logging::init();

    let blog = Blog::new(QuillConfig::default())?;
    let mut alice = RequestContext::anonymous();
    let mut bob = RequestContext::anonymous();
    let mut visitor = RequestContext::anonymous();

    let script = vec![
        ("alice", register("Alice", "a@x.com", "pw1")),
        ("alice", Route::NewPost { title: "Hello".into(), body: "First post".into() }),
        ("visitor", Route::Index),
        ("visitor", Route::NewPost { title: "Spam".into(), body: "...".into() }),
        ("bob", register("Bob", "a@x.com", "pw2")),
        ("bob", register("Bob", "b@x.com", "pw2")),
        ("bob", Route::Comment { post_id: 1, body: "Nice!".into() }),
        ("bob", Route::EditPost { post_id: 1, title: "Mine now".into(), body: "".into() }),
        ("bob", Route::Logout),
        ("bob", Route::Login { email: "b@x.com".into(), password: "wrong".into() }),
        ("alice", Route::EditPost { post_id: 1, title: "Hello, world".into(), body: "Edited".into() }),
        ("visitor", Route::ShowPost(1)),
        ("alice", Route::DeletePost(1)),
        ("alice", Route::Logout),
    ];

    for (who, route) in script {
        let ctx = match who {
            "alice" => &mut alice,
            "bob" => &mut bob,
            _ => &mut visitor,
        };
        let path = route.path();
        let response = blog.handle(ctx, route).await;
        println!("{who} {path} -> {}", serde_json::to_string(&response)?);
    }

    Ok(())
}
