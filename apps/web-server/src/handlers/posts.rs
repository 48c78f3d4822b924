//! Post feeds, the post page and the post form.

use actix_web::{HttpRequest, HttpResponse, web};

use yatube_core::PageRequest;
use yatube_core::domain::{NewPost, PostEntry, PostFilter};
use yatube_core::forms::{FormError, PostFormData};

use super::context::{
    FormView, GROUP_LIST_TEMPLATE, GroupListContext, INDEX_TEMPLATE, IndexContext,
    POST_DETAIL_TEMPLATE, POST_FORM_TEMPLATE, PROFILE_TEMPLATE, PostDetailContext,
    PostFormContext, ProfileContext, author_item, group_item, post_item,
};
use super::{redirect, render};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// The requested page. A repeated `page` parameter resolves to its last
/// value; an undecodable query string is treated as no page at all.
fn page_request(req: &HttpRequest) -> PageRequest {
    let page = url::form_urlencoded::parse(req.query_string().as_bytes())
        .filter(|(key, _)| key == "page")
        .last()
        .map(|(_, value)| value);
    PageRequest::parse(page.as_deref())
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

pub fn post_detail_url(post_id: i32) -> String {
    format!("/posts/{post_id}/")
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let page = state
        .paginator
        .page_of_posts(state.posts.as_ref(), &PostFilter::All, page_request(&req))
        .await?;

    Ok(render(
        INDEX_TEMPLATE,
        IndexContext {
            page_obj: page.map(post_item),
        },
    ))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No group with slug '{slug}'")))?;

    let page = state
        .paginator
        .page_of_posts(
            state.posts.as_ref(),
            &PostFilter::Group(group.id),
            page_request(&req),
        )
        .await?;

    Ok(render(
        GROUP_LIST_TEMPLATE,
        GroupListContext {
            group: group_item(group),
            page_obj: page.map(post_item),
        },
    ))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    username: web::Path<String>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user named '{username}'")))?;

    let page = state
        .paginator
        .page_of_posts(
            state.posts.as_ref(),
            &PostFilter::Author(author.id),
            page_request(&req),
        )
        .await?;

    Ok(render(
        PROFILE_TEMPLATE,
        ProfileContext {
            author: author_item((&author).into()),
            posts_count: page.count,
            page_obj: page.map(post_item),
        },
    ))
}

async fn find_post(state: &AppState, post_id: i32) -> AppResult<PostEntry> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No post with id {post_id}")))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    post_id: web::Path<i32>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let entry = find_post(&state, *post_id).await?;
    let posts_count = state
        .posts
        .count(&PostFilter::Author(entry.author.id))
        .await?;
    let can_edit = viewer
        .0
        .is_some_and(|identity| entry.post.is_authored_by(identity.user_id));

    Ok(render(
        POST_DETAIL_TEMPLATE,
        PostDetailContext {
            title: entry.post.title(),
            posts_count,
            can_edit,
            post: post_item(entry),
        },
    ))
}

/// Render the post form, bound to `form`.
async fn render_post_form(
    state: &AppState,
    form: FormView<PostFormData>,
    post_id: Option<i32>,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list().await?;

    Ok(render(
        POST_FORM_TEMPLATE,
        PostFormContext {
            form,
            groups: groups.into_iter().map(group_item).collect(),
            is_edit: post_id.is_some(),
            post_id,
        },
    ))
}

/// GET /create/
pub async fn create_form(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    render_post_form(&state, FormView::unbound(PostFormData::default()), None).await
}

/// POST /create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let data: PostFormData = form.into_inner().into_iter().collect();

    let valid = match data.validate(state.groups.as_ref()).await {
        Ok(valid) => valid,
        Err(FormError::Invalid(errors)) => {
            tracing::debug!(user = %identity.username, ?errors, "Rejected new post");
            return render_post_form(&state, FormView::invalid(data, errors), None).await;
        }
        Err(e) => return Err(e.into()),
    };

    let post = state
        .posts
        .create(NewPost::new(identity.user_id, valid.text, valid.group_id))
        .await?;
    tracing::info!(post_id = post.id, user = %identity.username, "Post created");

    Ok(redirect(profile_url(&identity.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let entry = find_post(&state, *post_id).await?;
    if !entry.post.is_authored_by(identity.user_id) {
        return Ok(redirect(post_detail_url(entry.post.id)));
    }

    let form = FormView::unbound(PostFormData::from_post(&entry.post));
    render_post_form(&state, form, Some(entry.post.id)).await
}

/// POST /posts/{post_id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<i32>,
    form: web::Form<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let entry = find_post(&state, *post_id).await?;
    let post_id = entry.post.id;
    if !entry.post.is_authored_by(identity.user_id) {
        tracing::warn!(post_id, user = %identity.username, "Edit refused: not the author");
        return Ok(redirect(post_detail_url(post_id)));
    }

    let data: PostFormData = form.into_inner().into_iter().collect();
    let valid = match data.validate(state.groups.as_ref()).await {
        Ok(valid) => valid,
        Err(FormError::Invalid(errors)) => {
            return render_post_form(&state, FormView::invalid(data, errors), Some(post_id)).await;
        }
        Err(e) => return Err(e.into()),
    };

    state.posts.update(post_id, valid.into()).await?;
    tracing::info!(post_id, user = %identity.username, "Post updated");

    Ok(redirect(post_detail_url(post_id)))
}
