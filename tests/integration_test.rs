use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use context_propagation::{
    Authentication, ContextHolder, ContextPropagatingInvocation, GlobalContextHolder,
    HolderStrategy, InvocationError, InvocationExecutor, MethodCall, PropagationConfig,
    RemoteInvocationFactory, SecurityContext, ServiceTarget, ThreadLocalContextHolder,
    UsernamePasswordToken,
};
use serde_json::{Value, json};

/// A bank service whose handlers read the caller from the ambient holder.
fn bank(audit: Arc<Mutex<Vec<Option<String>>>>) -> ServiceTarget {
    ServiceTarget::new("bank")
        .method("balance", &["String"], move |args, _| {
            let caller = ThreadLocalContextHolder
                .context()
                .authentication()
                .map(|a| a.name());
            audit.lock().unwrap().push(caller.clone());
            Ok(json!({ "account": args[0].clone(), "caller": caller }))
        })
        .method("withdraw", &["String", "u64"], |_, _| {
            Err("insufficient funds".into())
        })
        .internal_method("purge", &[], |_, _| Ok(Value::Null))
}

fn logged_in(principal: &str, password: &str) -> SecurityContext {
    SecurityContext::with_authentication(UsernamePasswordToken::authenticated(
        principal,
        Some(password),
        ["ROLE_CUSTOMER"],
    ))
}

#[test]
fn identity_crosses_from_client_thread_to_server_thread() {
    let (tx, rx) = mpsc::channel::<Vec<u8>>();

    let client = thread::spawn(move || {
        ThreadLocalContextHolder.set_context(logged_in("alice", "hunter2"));
        let call = MethodCall::new("balance").with_argument("String", json!("acct-7"));
        let factory = PropagationConfig::default().invocation_factory();
        let wire = factory.create_remote_invocation(call).to_wire().unwrap();
        ThreadLocalContextHolder.clear_context();
        tx.send(wire).unwrap();
    });

    let audit = Arc::new(Mutex::new(Vec::new()));
    let target = bank(audit.clone());
    let server = thread::spawn(move || {
        let wire = rx.recv().unwrap();
        let invocation = ContextPropagatingInvocation::from_wire(&wire).unwrap();
        let result = invocation.invoke(&target).unwrap();
        (result, ThreadLocalContextHolder.context().is_empty())
    });

    client.join().unwrap();
    let (result, cleared) = server.join().unwrap();

    assert_eq!(result, json!({ "account": "acct-7", "caller": "alice" }));
    assert!(cleared, "server thread kept the caller's identity");
    assert_eq!(*audit.lock().unwrap(), vec![Some("alice".to_string())]);
}

#[test]
fn pooled_worker_does_not_leak_identity_between_calls() {
    let audit = Arc::new(Mutex::new(Vec::new()));
    let target = bank(audit.clone());

    let first = ContextPropagatingInvocation::from_context(
        MethodCall::new("balance").with_argument("String", json!("acct-1")),
        &logged_in("alice", "pw"),
    );
    let second = ContextPropagatingInvocation::from_context(
        MethodCall::new("balance").with_argument("String", json!("acct-2")),
        &SecurityContext::empty(),
    );
    let failing = ContextPropagatingInvocation::from_context(
        MethodCall::new("withdraw")
            .with_argument("String", json!("acct-1"))
            .with_argument("u64", json!(1_000_000)),
        &logged_in("mallory", "pw"),
    );

    // One worker thread serves all three calls in turn.
    let worker = thread::spawn(move || {
        first.invoke(&target).unwrap();
        assert!(failing.invoke(&target).is_err());
        second.invoke(&target).unwrap();
    });
    worker.join().unwrap();

    assert_eq!(
        *audit.lock().unwrap(),
        vec![Some("alice".to_string()), None]
    );
}

#[test]
fn failures_pass_through_unchanged() {
    let target = bank(Arc::new(Mutex::new(Vec::new())));
    let ctx = logged_in("bob", "pw");

    let withdraw = ContextPropagatingInvocation::from_context(
        MethodCall::new("withdraw")
            .with_argument("String", json!("acct-1"))
            .with_argument("u64", json!(5)),
        &ctx,
    );
    match withdraw.invoke(&target).unwrap_err() {
        InvocationError::TargetFailed { signature, source } => {
            assert_eq!(signature.to_string(), "withdraw(String, u64)");
            assert_eq!(source.to_string(), "insufficient funds");
        }
        other => panic!("expected TargetFailed, got {other:?}"),
    }

    let purge = ContextPropagatingInvocation::from_context(MethodCall::new("purge"), &ctx);
    assert!(matches!(
        purge.invoke(&target),
        Err(InvocationError::AccessDenied { .. })
    ));

    let close = ContextPropagatingInvocation::from_context(MethodCall::new("close"), &ctx);
    assert!(matches!(
        close.invoke(&target),
        Err(InvocationError::MethodNotFound { .. })
    ));

    assert!(ThreadLocalContextHolder.context().is_empty());
}

#[test]
fn installed_identity_is_never_trusted() {
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let target = ServiceTarget::new("vault").method("check", &[], move |_, ctx| {
        let auth = ctx.authentication().expect("identity installed");
        let token = auth
            .as_any()
            .downcast_ref::<UsernamePasswordToken>()
            .expect("default request type");
        *sink.lock().unwrap() = Some((auth.is_authenticated(), token.authorities().len()));
        Ok(Value::Null)
    });

    // The caller held a fully authenticated token with authorities.
    let ctx = logged_in("carol", "pw");
    let invocation = ContextPropagatingInvocation::from_context(MethodCall::new("check"), &ctx);
    InvocationExecutor::new()
        .execute(&invocation, &target)
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), Some((false, 0)));
}

// The only test in this binary that touches the process-wide slot.
#[test]
fn global_strategy_round_trip() {
    let config = PropagationConfig {
        strategy: HolderStrategy::Global,
    };
    GlobalContextHolder.set_context(logged_in("dave", "pw"));

    let invocation = config
        .invocation_factory()
        .create_remote_invocation(MethodCall::new("whoami"));
    GlobalContextHolder.clear_context();
    assert_eq!(invocation.principal(), Some("dave"));

    let target = ServiceTarget::new("directory").method("whoami", &[], |_, _| {
        // Visible from any thread while the call runs.
        let name = thread::spawn(|| {
            GlobalContextHolder
                .context()
                .authentication()
                .map(|a| a.name())
        })
        .join()
        .map_err(|_| "reader thread panicked")?;
        Ok(json!(name))
    });

    let result = config.executor().execute(&invocation, &target).unwrap();

    assert_eq!(result, json!("dave"));
    assert!(GlobalContextHolder.context().is_empty());
}
