//! Execution gate 통합 테스트 - mock host 레지스트리/런타임으로 전체 흐름 검증
//!
//! `cargo test -p llmexec-core --test gate_flow`

use async_trait::async_trait;
use llmexec_core::{
    CommandHandler, Delivery, ErrorKind, ExecutionRequest, ExecutorConfig, ExecutorContext,
    FnHandler, HandlerCache, HandlerFault, HostPlugin, HostRegistry, HostRuntime, Identity,
    Invocation, MessageSegment, OutputMessage, PolicyConfig, RawCommand, Result, StaticHandler,
    StaticSettings, ToolCallContext,
};
use llmexec_foundation::Error;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

// ============================================================================
// Mock host
// ============================================================================

struct MockHost {
    plugins: RwLock<Vec<HostPlugin>>,
    down: AtomicBool,
}

impl HostRegistry for MockHost {
    fn enumerate(&self) -> Result<Vec<HostPlugin>> {
        if self.down.load(Ordering::SeqCst) {
            return Err(Error::HostUnavailable("plugin manager not ready".into()));
        }
        Ok(self.plugins.read().clone())
    }
}

#[derive(Default)]
struct RecordingRuntime {
    delivered: Mutex<Vec<Delivery>>,
    fail_forward: AtomicBool,
    panic_on_deliver: AtomicBool,
}

#[async_trait]
impl HostRuntime for RecordingRuntime {
    async fn deliver(
        &self,
        _invocation: &Invocation,
        delivery: Delivery,
    ) -> std::result::Result<(), HandlerFault> {
        if self.panic_on_deliver.load(Ordering::SeqCst) {
            panic!("send_message exploded");
        }
        if matches!(delivery, Delivery::Forward(_)) && self.fail_forward.load(Ordering::SeqCst) {
            return Err(HandlerFault::Delivery("forward not supported".into()));
        }
        self.delivered.lock().push(delivery);
        Ok(())
    }
}

/// 받은 호출 정보를 기록하는 handler
struct Recorder {
    seen: Arc<Mutex<Vec<Invocation>>>,
}

#[async_trait]
impl CommandHandler for Recorder {
    async fn handle(&self, invocation: &Invocation) -> std::result::Result<Vec<OutputMessage>, HandlerFault> {
        self.seen.lock().push(invocation.clone());
        Ok(vec![OutputMessage::text(format!("{} 已处理", invocation.command))])
    }
}

struct Fixture {
    ctx: ExecutorContext,
    host: Arc<MockHost>,
    runtime: Arc<RecordingRuntime>,
    settings: Arc<StaticSettings>,
    seen: Arc<Mutex<Vec<Invocation>>>,
}

fn plugins(seen: &Arc<Mutex<Vec<Invocation>>>) -> Vec<HostPlugin> {
    let recorder = || -> Arc<dyn CommandHandler> { Arc::new(Recorder { seen: seen.clone() }) };

    vec![
        HostPlugin::new("签到插件").command(
            RawCommand::new(
                "签到",
                FnHandler::shared(|inv| {
                    Ok(vec![OutputMessage::text(format!("签到成功 {}", inv.sender_id))])
                }),
            )
            .alias("sign")
            .description("每日签到"),
        ),
        HostPlugin::new("钓鱼插件")
            .command(RawCommand::new(
                "/钓鱼",
                FnHandler::shared(|inv| {
                    let times = inv.tokens.first().map(String::as_str).unwrap_or("1");
                    Ok(vec![OutputMessage::text(format!("钓到了 {times} 条鱼"))])
                }),
            ))
            .command(RawCommand::new(
                "背包",
                Arc::new(StaticHandler::new(vec![OutputMessage::image("http://img/bag.png")])),
            )),
        HostPlugin::new("银行").command(RawCommand::new("转账", recorder())),
        HostPlugin::new("群管")
            .command(RawCommand::new("禁言", recorder()).admin_only(true))
            .command(RawCommand::new("踢人", recorder())),
        HostPlugin::new("测试")
            .command(RawCommand::new(
                "报错",
                FnHandler::shared(|_| Err(HandlerFault::failed("余额不足"))),
            ))
            .command(RawCommand::new(
                "崩溃",
                FnHandler::shared(|_| -> std::result::Result<Vec<OutputMessage>, HandlerFault> {
                    panic!("boom")
                }),
            ))
            .command(RawCommand::new("静默", Arc::new(StaticHandler::new(vec![]))))
            .command(RawCommand::new("长文", StaticHandler::text("鱼".repeat(1600)))),
        HostPlugin::new("旧插件")
            .activated(false)
            .command(RawCommand::new("旧指令", recorder())),
    ]
}

fn fixture(config: ExecutorConfig) -> Fixture {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let host = Arc::new(MockHost {
        plugins: RwLock::new(plugins(&seen)),
        down: AtomicBool::new(false),
    });
    let runtime = Arc::new(RecordingRuntime::default());
    let settings = Arc::new(StaticSettings::new(config));
    let ctx = ExecutorContext::new(host.clone(), runtime.clone(), settings.clone());

    Fixture {
        ctx,
        host,
        runtime,
        settings,
        seen,
    }
}

fn default_config() -> ExecutorConfig {
    ExecutorConfig::default().with_policy(PolicyConfig::new().blacklist(["转账"]))
}

fn request(command: &str) -> ExecutionRequest {
    ExecutionRequest::new(command, "10001")
}

async fn tool(f: &Fixture, name: &str, input: Value) -> Value {
    let ctx = ToolCallContext::new("10001").platform("aiocqhttp");
    let raw = f.ctx.call_tool(name, input, &ctx).await;
    serde_json::from_str(&raw).unwrap()
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn test_sign_in_via_tool() {
    let f = fixture(default_config());
    let out = tool(&f, "execute_command", json!({"command": "签到"})).await;

    assert_eq!(
        out,
        json!({
            "success": true,
            "command": "签到",
            "args": null,
            "result": "签到成功 10001",
            "executed_as": "user",
        })
    );
    assert_eq!(f.runtime.delivered.lock().len(), 1);
}

#[tokio::test]
async fn test_alias_and_prefix_resolve_to_canonical_name() {
    let f = fixture(default_config());

    let by_alias = f.ctx.execute(request("sign")).await;
    assert_eq!(by_alias.command(), "签到");
    assert!(by_alias.is_success());

    let with_prefix = f.ctx.execute(request("/钓鱼").args("3")).await;
    let json = with_prefix.to_json();
    assert_eq!(json["command"], "钓鱼");
    assert_eq!(json["result"], "钓到了 3 条鱼");
    assert_eq!(json["args"], "3");
}

#[tokio::test]
async fn test_blacklisted_command_never_invoked() {
    let f = fixture(default_config());
    let out = tool(&f, "execute_command", json!({"command": "转账", "args": "@0 100"})).await;

    assert_eq!(out["success"], false);
    assert_eq!(out["command"], "转账");
    assert_eq!(out["error"], "blacklisted");
    assert_eq!(out["error_kind"], "permission_denied");
    assert!(f.seen.lock().is_empty());
    assert!(f.runtime.delivered.lock().is_empty());
}

#[tokio::test]
async fn test_unknown_command() {
    let f = fixture(default_config());
    let out = tool(&f, "execute_command", json!({"command": "不存在指令"})).await;

    assert_eq!(out["success"], false);
    assert_eq!(out["command"], "不存在指令");
    assert_eq!(out["error_kind"], "unknown_command");
    assert!(out["error"].as_str().unwrap().contains("不存在指令"));
}

#[tokio::test]
async fn test_inactive_plugin_commands_unknown() {
    let f = fixture(default_config());
    let result = f.ctx.execute(request("旧指令")).await;
    assert_eq!(result.error_kind(), Some(ErrorKind::UnknownCommand));
}

#[tokio::test]
async fn test_empty_command_is_invalid() {
    let f = fixture(default_config());
    let out = tool(&f, "execute_command", json!({"command": "  "})).await;
    assert_eq!(out["error_kind"], "invalid_request");
    assert_eq!(out["error"], "missing required parameter: command");

    let out = tool(&f, "execute_command", json!({"args": "x"})).await;
    assert_eq!(out["error_kind"], "invalid_request");
}

#[tokio::test]
async fn test_admin_command_grants() {
    let f = fixture(default_config());
    let denied = f.ctx.execute(request("禁言")).await;
    assert_eq!(denied.error_kind(), Some(ErrorKind::PermissionDenied));

    f.settings.update(|c| {
        c.policy.admin_users.insert("10001".into());
    });
    assert!(f.ctx.execute(request("禁言")).await.is_success());

    f.settings.replace(
        ExecutorConfig::default().with_policy(PolicyConfig::new().allow_admin_commands(true)),
    );
    assert!(f.ctx.execute(ExecutionRequest::new("禁言", "someone")).await.is_success());
}

#[tokio::test]
async fn test_config_change_applies_to_next_request() {
    let f = fixture(default_config());
    assert!(f.ctx.execute(request("签到")).await.is_success());

    f.settings.update(|c| c.policy.enabled = false);
    let result = f.ctx.execute(request("签到")).await;
    assert_eq!(result.error_kind(), Some(ErrorKind::PermissionDenied));
    assert_eq!(result.to_json()["error"], "executor disabled");
}

#[tokio::test]
async fn test_handler_error_is_isolated() {
    let f = fixture(default_config());

    let failed = f.ctx.execute(request("报错")).await;
    assert_eq!(failed.error_kind(), Some(ErrorKind::ExecutionError));
    assert_eq!(failed.to_json()["error"], "余额不足");

    assert!(f.ctx.execute(request("签到")).await.is_success());
}

#[tokio::test]
async fn test_handler_panic_is_isolated() {
    let f = fixture(default_config());

    let crashed = f.ctx.execute(request("崩溃")).await;
    assert_eq!(crashed.error_kind(), Some(ErrorKind::ExecutionError));
    assert!(crashed.to_json()["error"].as_str().unwrap().contains("boom"));

    assert!(f.ctx.execute(request("签到")).await.is_success());
    assert_eq!(f.ctx.cache().generation(), 1);
}

#[tokio::test]
async fn test_image_and_empty_outputs() {
    let f = fixture(default_config());

    let bag = f.ctx.execute(request("背包")).await.to_json();
    assert_eq!(bag["result"], "command returned 1 image(s)");
    assert_eq!(bag["images"], json!(["http://img/bag.png"]));

    let quiet = f.ctx.execute(request("静默")).await.to_json();
    assert_eq!(quiet["result"], "command completed with no output");
    assert!(quiet.get("images").is_none());
}

#[tokio::test]
async fn test_as_bot_identity() {
    let f = fixture(default_config().bot_user_id("bot_42"));
    let out = tool(&f, "execute_command", json!({"command": "签到", "as_bot": true})).await;

    assert_eq!(out["result"], "签到成功 bot_42");
    assert_eq!(out["executed_as"], "bot");
}

#[tokio::test]
async fn test_mentions_and_reply_image_reach_handler() {
    let f = fixture(default_config());
    let out = tool(
        &f,
        "execute_command",
        json!({
            "command": "踢人",
            "args": "@1 理由 @0",
            "at_user_list": ["111", 222],
            "reply_image_url": "http://img/proof.png",
        }),
    )
    .await;
    assert_eq!(out["success"], true);

    let seen = f.seen.lock();
    let inv = &seen[0];
    assert_eq!(inv.message, "/踢人 @1 理由 @0");
    assert_eq!(inv.tokens, vec!["@1", "理由", "@0"]);
    assert_eq!(inv.identity, Identity::User);
    assert_eq!(inv.platform.as_deref(), Some("aiocqhttp"));
    assert_eq!(
        inv.segments,
        vec![
            MessageSegment::Reply {
                image_url: "http://img/proof.png".into()
            },
            MessageSegment::text("/踢人"),
            MessageSegment::mention("222"),
            MessageSegment::text(" 理由"),
            MessageSegment::mention("111"),
        ]
    );
}

// ============================================================================
// Delivery
// ============================================================================

#[tokio::test]
async fn test_long_output_forwarded_on_supported_platform() {
    let f = fixture(default_config());
    let result = f.ctx.execute(request("长文").platform("aiocqhttp")).await;
    assert!(result.is_success());

    let delivered = f.runtime.delivered.lock();
    assert_eq!(delivered.len(), 1);
    assert!(matches!(delivered[0], Delivery::Forward(_)));
}

#[tokio::test]
async fn test_long_output_sent_normally_elsewhere() {
    let f = fixture(default_config());
    f.ctx.execute(request("长文").platform("telegram")).await;

    let delivered = f.runtime.delivered.lock();
    assert!(matches!(delivered[0], Delivery::Single(_)));
}

#[tokio::test]
async fn test_forward_failure_falls_back() {
    let f = fixture(default_config());
    f.runtime.fail_forward.store(true, Ordering::SeqCst);

    let result = f.ctx.execute(request("长文").platform("aiocqhttp")).await;
    assert!(result.is_success());

    let delivered = f.runtime.delivered.lock();
    assert_eq!(delivered.len(), 1);
    assert!(matches!(delivered[0], Delivery::Single(_)));
}

#[tokio::test]
async fn test_runtime_panic_during_delivery_is_isolated() {
    let f = fixture(default_config());
    f.runtime.panic_on_deliver.store(true, Ordering::SeqCst);

    let result = f.ctx.execute(request("签到")).await;
    assert!(result.is_success());
    assert_eq!(result.to_json()["result"], "签到成功 10001");
    assert!(f.runtime.delivered.lock().is_empty());

    f.runtime.panic_on_deliver.store(false, Ordering::SeqCst);
    assert!(f.ctx.execute(request("签到")).await.is_success());
    assert_eq!(f.runtime.delivered.lock().len(), 1);
}

// ============================================================================
// Cache lifecycle
// ============================================================================

#[tokio::test]
async fn test_lazy_build_on_first_request() {
    let f = fixture(default_config());
    assert_eq!(f.ctx.cache().generation(), 0);

    f.ctx.execute(request("签到")).await;
    assert_eq!(f.ctx.cache().generation(), 1);
}

#[tokio::test]
async fn test_empty_first_build_is_retried() {
    let f = fixture(default_config());
    let registered = std::mem::take(&mut *f.host.plugins.write());

    let first = f.ctx.execute(request("签到")).await;
    assert_eq!(first.error_kind(), Some(ErrorKind::UnknownCommand));
    assert_eq!(f.ctx.cache().generation(), 1);
    assert!(f.ctx.cache().is_empty());

    *f.host.plugins.write() = registered;

    let second = f.ctx.execute(request("签到")).await;
    assert!(second.is_success());
    assert_eq!(f.ctx.cache().generation(), 2);

    // 채워진 뒤에는 다시 구축하지 않는다
    f.ctx.execute(request("签到")).await;
    assert_eq!(f.ctx.cache().generation(), 2);
}

#[tokio::test]
async fn test_list_retries_empty_cache() {
    let f = fixture(default_config());
    let registered = std::mem::take(&mut *f.host.plugins.write());

    let empty = tool(&f, "list_executable_commands", json!({})).await;
    assert_eq!(empty["total_count"], 0);

    *f.host.plugins.write() = registered;
    let out = tool(&f, "list_executable_commands", json!({})).await;
    assert_eq!(out["total_count"], 10);
}

#[tokio::test]
async fn test_first_build_failure_reports_rebuild_error() {
    let f = fixture(default_config());
    f.host.down.store(true, Ordering::SeqCst);

    let result = f.ctx.execute(request("签到")).await;
    assert_eq!(result.error_kind(), Some(ErrorKind::RebuildError));
}

#[tokio::test]
async fn test_refresh_removes_unregistered_commands() {
    let f = fixture(default_config());
    assert_eq!(f.ctx.refresh().unwrap().commands, 10);

    f.host.plugins.write().retain(|p| p.name != "钓鱼插件");
    f.ctx.refresh().unwrap();

    let result = f.ctx.execute(request("钓鱼")).await;
    assert_eq!(result.error_kind(), Some(ErrorKind::UnknownCommand));
}

#[tokio::test]
async fn test_failed_refresh_keeps_serving() {
    let f = fixture(default_config());
    f.ctx.refresh().unwrap();

    f.host.down.store(true, Ordering::SeqCst);
    assert!(f.ctx.refresh().is_err());
    assert!(f.ctx.execute(request("签到")).await.is_success());
}

#[test]
fn test_status_counts_per_plugin() {
    let f = fixture(default_config());
    f.ctx.refresh().unwrap();

    let status = f.ctx.status();
    assert_eq!(status.cached_commands, 10);
    assert_eq!(status.plugin_counts["钓鱼插件"], 2);
    assert_eq!(status.blacklist, vec!["转账".to_string()]);
    assert!(!status.plugin_counts.contains_key("旧插件"));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_by_category() {
    let f = fixture(default_config());
    let out = tool(&f, "list_executable_commands", json!({"category": "钓鱼插件"})).await;

    assert_eq!(out["success"], true);
    assert_eq!(out["total_count"], 2);
    let plugins = out["plugins"].as_object().unwrap();
    assert_eq!(plugins.len(), 1);

    let names: Vec<&str> = plugins["钓鱼插件"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["command"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["背包", "钓鱼"]);
}

#[tokio::test]
async fn test_list_ignores_policy() {
    let f = fixture(default_config());
    let out = tool(&f, "list_executable_commands", json!({})).await;

    assert_eq!(out["total_count"], 10);
    assert_eq!(out["plugins"]["银行"][0]["command"], "转账");
    assert_eq!(out["plugins"]["签到插件"][0]["aliases"], json!(["sign"]));
    assert_eq!(out["plugins"]["签到插件"][0]["description"], "每日签到");
}

#[tokio::test]
async fn test_list_rejects_malformed_input() {
    let f = fixture(default_config());
    let out = tool(&f, "list_executable_commands", json!({"category": 5})).await;

    assert_eq!(out["success"], false);
    assert_eq!(out["error_kind"], "invalid_request");
    assert!(out.get("plugins").is_none());
}

#[tokio::test]
async fn test_unknown_tool() {
    let f = fixture(default_config());
    let out = tool(&f, "delete_everything", json!({})).await;
    assert_eq!(out["success"], false);
}

#[test]
fn test_tool_definitions() {
    let f = fixture(default_config());
    let defs = f.ctx.tools().definitions();
    let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();

    assert_eq!(names, vec!["execute_command", "list_executable_commands"]);
    assert_eq!(defs[0].parameters["required"], json!(["command"]));
}

// ============================================================================
// Concurrency
// ============================================================================

/// 재구축마다 명령 세트 전체가 바뀌는 host
struct FlippingHost {
    flip: AtomicBool,
}

impl HostRegistry for FlippingHost {
    fn enumerate(&self) -> Result<Vec<HostPlugin>> {
        let flipped = !self.flip.fetch_xor(true, Ordering::SeqCst);
        let (a, b) = if flipped { ("new_a", "new_b") } else { ("old_a", "old_b") };
        Ok(vec![HostPlugin::new("p")
            .command(RawCommand::new(a, StaticHandler::text(a)))
            .command(RawCommand::new(b, StaticHandler::text(b)))])
    }
}

#[test]
fn test_readers_never_see_mixed_generation() {
    let cache = Arc::new(HandlerCache::new(Arc::new(FlippingHost {
        flip: AtomicBool::new(false),
    })));
    cache.rebuild().unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let snap = cache.snapshot();
                    let old = snap.resolve("old_a").is_some() && snap.resolve("old_b").is_some();
                    let new = snap.resolve("new_a").is_some() && snap.resolve("new_b").is_some();
                    assert!(old ^ new, "mixed snapshot at generation {}", snap.generation);
                    assert_eq!(snap.len(), 2);
                }
            })
        })
        .collect();

    let writer = {
        let cache = cache.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                cache.rebuild().unwrap();
            }
        })
    };

    writer.join().unwrap();
    stop.store(true, Ordering::SeqCst);
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(cache.generation(), 201);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_executions_share_cache() {
    let f = Arc::new(fixture(default_config()));
    f.ctx.refresh().unwrap();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let f = f.clone();
            tokio::spawn(async move {
                let command = if i % 2 == 0 { "签到" } else { "报错" };
                f.ctx.execute(ExecutionRequest::new(command, format!("u{i}"))).await
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let result = task.await.unwrap();
        assert_eq!(result.is_success(), i % 2 == 0);
    }
    assert_eq!(f.ctx.cache().generation(), 1);
}
