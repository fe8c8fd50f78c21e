use std::process::ExitCode;
use std::time::{Duration, SystemTime};

use clap::{Parser, Subcommand};
use tarpc::context;

use post_directory::*;

/// Command line client for the post directory
#[derive(Parser)]
#[command(name = "post-client", about = "Talk to a post directory server")]
struct Cli {
    /// Server address (host:port)
    #[arg(short, long, env = "POST_SERVER_ADDR", default_value = "127.0.0.1:50051")]
    server: String,

    /// Per-call deadline in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every post
    List,
    /// Print one post
    Read { id: String },
    /// Overwrite owner, title and body of a post
    Update {
        id: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Delete a post
    Delete { id: String },
}

fn print_post(post: &Post) {
    println!("{}\towner={}\ttitle={:?}\tbody={:?}", post.id, post.owner_id, post.title, post.body);
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let client = rpc::connect(cli.server).await?;

    let mut ctx = context::current();
    ctx.deadline = SystemTime::now() + Duration::from_secs(cli.timeout);

    let outcome = match cli.command {
        Command::List => client
            .get_posts(ctx, GetPostsRequest {})
            .await?
            .map(|posts| posts.iter().for_each(print_post)),
        Command::Read { id } => client
            .read_post(ctx, ReadPostRequest { post_id: id })
            .await?
            .map(|post| print_post(&post)),
        Command::Update { id, owner, title, body } => {
            let post = Post { id, owner_id: owner, title, body };
            client
                .update_post(ctx, UpdatePostRequest { post })
                .await?
                .map(|post| print_post(&post))
        }
        Command::Delete { id } => client
            .delete_post(ctx, DeletePostRequest { post_id: id })
            .await?
            .map(|resp| println!("deleted {}", resp.post_id)),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(status) => {
            eprintln!("{status}");
            Ok(ExitCode::FAILURE)
        }
    }
}
