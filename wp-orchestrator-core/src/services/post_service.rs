//! 文章生成服务

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{CoreError, CoreResult};
use crate::remote::naming::{format_post_date, PostTimeline};
use crate::remote::{shell_quote, Shell, WpCli};
use crate::services::{strip_quotes, ServiceContext};
use crate::types::{AuthMethod, CompletedStep, GeneratedPost, HostTarget, SiteStatus};

/// Outcome of a post generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostRunSummary {
    pub created: u32,
    pub skipped: u32,
}

pub struct PostService {
    ctx: Arc<ServiceContext>,
}

impl PostService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Generate and publish `count` posts with featured images.
    ///
    /// Posts are dated backwards from now, each 1 to `post_date_max_step_days`
    /// days before the previous one. A failing post is skipped; only a dropped
    /// session fails the run. The site ends `done` either way, but
    /// `posts_created` is set only when at least one post was published.
    pub async fn generate_posts(
        &self,
        server: &HostTarget,
        domain: &str,
        keyword: &str,
        count: u32,
    ) -> CoreResult<PostRunSummary> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = self.create_posts(&shell, domain, keyword, count).await;
            shell.close().await;
            result
        }
        .await;
        let step = match &result {
            Ok(summary) if summary.created > 0 => Some(CompletedStep::PostsCreated),
            _ => None,
        };
        self.ctx
            .finish_site(domain, "generate posts", &result, step)
            .await;
        result
    }

    async fn create_posts(
        &self,
        shell: &Shell,
        domain: &str,
        keyword: &str,
        count: u32,
    ) -> CoreResult<PostRunSummary> {
        let wp = WpCli::new(&self.ctx.settings, domain);
        let mut rng = StdRng::from_os_rng();
        let mut timeline = PostTimeline::new(
            Local::now().naive_local(),
            self.ctx.settings.post_date_max_step_days,
        );
        let mut summary = PostRunSummary::default();

        for n in 1..=count {
            let date = timeline.next(&mut rng);
            match self.create_post(shell, &wp, keyword, date).await {
                Ok(post_id) => {
                    summary.created += 1;
                    log::info!("[{domain}] Post {n}/{count} published as #{post_id}");
                }
                Err(e) if e.is_transport() => return Err(e),
                Err(e) => {
                    summary.skipped += 1;
                    log::warn!("[{domain}] Post {n}/{count} skipped: {e}");
                }
            }
        }

        if summary.created == 0 {
            log::warn!("[{domain}] None of {count} posts could be created");
        }
        Ok(summary)
    }

    async fn create_post(
        &self,
        shell: &Shell,
        wp: &WpCli,
        keyword: &str,
        date: NaiveDateTime,
    ) -> CoreResult<String> {
        let post = self
            .ctx
            .generator
            .generate_post(keyword)
            .await
            .map_err(|e| CoreError::Generation(e.to_string()))?;
        let title = strip_quotes(&post.title);
        if title.is_empty() || post.body.trim().is_empty() {
            return Err(CoreError::Generation("empty title or body".to_string()));
        }
        let image = self
            .ctx
            .generator
            .download_image(&post.image_url)
            .await
            .map_err(|e| CoreError::Generation(e.to_string()))?;

        let stem = format!("/tmp/wpo-{}", uuid::Uuid::new_v4());
        let files = UploadFiles {
            image: format!("{stem}.jpg"),
            body: format!("{stem}.html"),
        };
        let result = publish(shell, wp, &post, &title, &image, date, &files).await;
        shell
            .attempt(&format!("rm -f {} {}", files.image, files.body))
            .await?;
        result
    }
}

struct UploadFiles {
    image: String,
    body: String,
}

async fn publish(
    shell: &Shell,
    wp: &WpCli,
    post: &GeneratedPost,
    title: &str,
    image: &[u8],
    date: NaiveDateTime,
    files: &UploadFiles,
) -> CoreResult<String> {
    shell.put_file(image, &files.image).await?;
    let attachment = porcelain_id(
        shell,
        &wp.cmd(&format!("media import {} --porcelain", files.image)),
    )
    .await?;

    shell.put_file(post.body.as_bytes(), &files.body).await?;
    let post_id = porcelain_id(
        shell,
        &wp.cmd(&format!(
            "post create {} --post_title={} --post_status=publish --post_date='{}' --porcelain",
            files.body,
            shell_quote(title),
            format_post_date(date)
        )),
    )
    .await?;

    shell
        .attempt_exit(&wp.cmd(&format!(
            "post meta set {post_id} _thumbnail_id {attachment}"
        )))
        .await?;
    Ok(post_id)
}

/// Run a `--porcelain` command and return the id it prints.
async fn porcelain_id(shell: &Shell, command: &str) -> CoreResult<String> {
    let output = shell.check_exit(command).await?;
    let id = output.stdout.trim();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Ok(id.to_string())
    } else {
        Err(CoreError::Command {
            host: shell.host().to_string(),
            command: command.to_string(),
            detail: format!("expected an id, got {id:?}"),
        })
    }
}
