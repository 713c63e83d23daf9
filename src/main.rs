use clap::Parser;
use folio::session::settings::FONT_FAMILIES;
use folio::{Book, LoadCoordinator, LoadOutcome, Result, Session, SessionStore, ThemePreset};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 📚 folio - EPUB阅读工具
#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "一个用于阅读EPUB文件的Rust工具")]
#[command(version)]
struct Args {
    /// EPUB文件路径；省略时打开上次阅读的书
    #[arg(help = "要阅读的EPUB文件路径")]
    epub_file: Option<PathBuf>,

    /// 显示指定章节（从1开始）
    #[arg(short, long, help = "要显示的章节（使用章节索引，从1开始）")]
    chapter: Option<usize>,

    /// 显示目录
    #[arg(short, long, help = "显示书籍目录")]
    toc: bool,

    /// 设置文件路径
    #[arg(long, help = "设置文件路径（默认位于用户配置目录）")]
    settings: Option<PathBuf>,

    /// 不自动打开上次阅读的书
    #[arg(long, help = "不恢复上次的阅读位置")]
    no_resume: bool,

    #[arg(long, help = "设置字号（8-32）")]
    font_size: Option<u32>,

    #[arg(
        long,
        value_parser = clap::builder::PossibleValuesParser::new(FONT_FAMILIES),
        help = "设置字体"
    )]
    font_family: Option<String>,

    #[arg(long, help = "放大字号")]
    increase_font: bool,

    #[arg(long, help = "缩小字号")]
    decrease_font: bool,

    #[arg(long, help = "切换深色模式")]
    toggle_dark: bool,

    #[arg(
        long,
        help = "使用预设配色（cream, sepia, light-blue, light-green, light-yellow, default）"
    )]
    theme: Option<ThemePreset>,

    /// 详细输出模式
    #[arg(short, long, help = "显示详细信息")]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    println!("📚 folio - EPUB阅读工具");

    match run(args).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "folio=debug" } else { "folio=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// 打开或恢复书籍、显示当前章节并保存会话；返回结束时的会话
async fn run(args: Args) -> Result<Session> {
    let settings_path = args.settings.clone().unwrap_or_else(SessionStore::default_path);
    let mut store = SessionStore::new(settings_path);
    let loaded = store.load();
    if let Some(diagnostic) = &loaded.diagnostic {
        println!("⚠️  {}，已使用默认设置", diagnostic);
    }
    let mut session = Session::new(loaded.settings);

    apply_preferences(&mut session, &args);

    let coordinator = LoadCoordinator::default();
    let handle = match &args.epub_file {
        Some(path) => Some(coordinator.begin_load(path.clone())),
        None if args.no_resume => None,
        None => SessionStore::restore_target(session.settings()).map(|position| {
            println!("🔖 恢复上次的阅读: {}", position.book_path.display());
            coordinator.begin_load_at(&position)
        }),
    };

    match handle {
        Some(handle) => {
            println!("正在打开EPUB文件: {}", handle.path().display());
            let completion = handle.wait().await;
            if let LoadOutcome::Failed(e) = coordinator.complete(&mut session, completion) {
                println!("❌ 无法打开书籍: {}", e);
            }
        }
        None => println!("💡 没有要打开的书籍。请指定一个EPUB文件路径。"),
    }

    if session.book().is_some() {
        if let Some(index) = args.chapter {
            select_chapter(&mut session, index);
        }
        display_book(&session, args.toc, args.verbose)?;
    }

    println!("\n{}", session.status_line());

    match store.save(session.settings()) {
        Ok(()) => {
            if args.verbose {
                println!("💾 设置已保存到 {}", store.path().display());
            }
        }
        Err(e) => println!("⚠️  无法保存设置: {}", e),
    }

    Ok(session)
}

/// 应用命令行中的偏好设置
fn apply_preferences(session: &mut Session, args: &Args) {
    if let Some(size) = args.font_size {
        let applied = session.set_font_size(size);
        if applied != size {
            println!("⚠️  字号 {} 超出范围，已调整为 {}", size, applied);
        }
    }
    if args.increase_font {
        session.increase_font_size();
    }
    if args.decrease_font {
        session.decrease_font_size();
    }
    if let Some(family) = &args.font_family {
        session.set_font_family(family.as_str());
    }
    if args.toggle_dark {
        let dark = session.toggle_dark_mode();
        println!("🌙 深色模式: {}", if dark { "开" } else { "关" });
    }
    if let Some(preset) = args.theme {
        match session.apply_preset(preset) {
            Ok(()) => println!("🎨 已应用配色: {}", preset),
            Err(e) => println!("⚠️  无法应用配色 {}: {}", preset, e),
        }
    }
}

/// 切换到用户指定的章节（从1开始）
fn select_chapter(session: &mut Session, index: usize) {
    let result = match index.checked_sub(1) {
        Some(zero_based) => session.select_chapter(zero_based).map(|_| ()),
        None => Err(folio::EpubError::ChapterOutOfRange {
            index,
            count: session.book().map(Book::chapter_count).unwrap_or(0),
        }),
    };

    if result.is_err() {
        let count = session.book().map(Book::chapter_count).unwrap_or(0);
        println!("  ❌ 无效的章节索引: {}。可用范围: 1-{}", index, count);
    }
}

fn display_book(session: &Session, show_toc: bool, verbose: bool) -> Result<()> {
    let Some(book) = session.book() else {
        return Ok(());
    };

    println!("\n📊 书籍信息:");
    println!("  📖 书名: {}", book.title);
    println!("  ✍️  作者: {}", book.author);
    println!("  📚 章节数: {}", book.chapter_count());

    if verbose {
        let settings = session.settings();
        println!("\n  ⚙️  阅读设置:");
        println!("    字体: {} {}pt", settings.font_family, settings.font_size);
        println!("    深色模式: {}", if settings.dark_mode { "开" } else { "关" });
        println!("    配色: {} / {}", settings.bg_color, settings.text_color);
    }

    if show_toc {
        println!("\n🌳 目录:");
        for entry in book.chapters.table_of_contents() {
            println!("  {}", entry);
        }
    }

    let chapter = session.current_chapter()?;
    let spread = session.current_spread()?;

    println!("\n📄 {}", chapter.title);
    println!("{}", "━".repeat(40));
    println!("{}", spread.left.content);
    println!("{}", "━".repeat(40));
    println!("{}", spread.right.content);
    println!("{}", "━".repeat(40));

    Ok(())
}
