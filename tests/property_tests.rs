//! Property tests for identity capture, transport and restoration.

use std::sync::{Arc, Mutex};

use context_propagation::{
    Authentication, ContextHolder, ContextPropagatingInvocation, MethodCall, SecurityContext,
    ServiceTarget, ThreadLocalContextHolder, UsernamePasswordToken,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn arb_principal() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9@._ -]{1,24}").unwrap()
}

fn arb_credentials() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::string::string_regex("[!-~]{8,32}").unwrap())
}

fn arb_call() -> impl Strategy<Value = MethodCall> {
    (
        prop::string::string_regex("[a-z][a-z_]{0,15}").unwrap(),
        prop::collection::vec(any::<i64>(), 0..4),
    )
        .prop_map(|(name, args)| {
            let mut call = MethodCall::new(name);
            for arg in args {
                call = call.with_argument("i64", json!(arg));
            }
            call
        })
}

proptest! {
    /// Property: the envelope carries exactly the string forms of the identity
    #[test]
    fn proptest_capture_matches_identity(
        principal in arb_principal(),
        credentials in arb_credentials(),
        call in arb_call(),
    ) {
        let ctx = SecurityContext::with_authentication(UsernamePasswordToken::new(
            principal.clone(),
            credentials.as_deref(),
        ));
        let invocation = ContextPropagatingInvocation::from_context(call, &ctx);

        prop_assert_eq!(invocation.principal(), Some(principal.as_str()));
        prop_assert_eq!(
            invocation.credentials().map(|c| c.expose_secret().as_str()),
            credentials.as_deref()
        );
    }

    /// Property: transport preserves the call and the carried identity
    #[test]
    fn proptest_wire_preserves_envelope(
        principal in prop::option::of(arb_principal()),
        credentials in arb_credentials(),
        call in arb_call(),
    ) {
        let ctx = match &principal {
            Some(p) => SecurityContext::with_authentication(UsernamePasswordToken::new(
                p.clone(),
                credentials.as_deref(),
            )),
            None => SecurityContext::empty(),
        };
        let invocation = ContextPropagatingInvocation::from_context(call.clone(), &ctx);

        let wire = invocation.to_wire().unwrap();
        let decoded = ContextPropagatingInvocation::from_wire(&wire).unwrap();

        prop_assert_eq!(decoded.call(), &call);
        prop_assert_eq!(decoded.principal(), principal.as_deref());
        prop_assert_eq!(decoded.credentials(), invocation.credentials());
    }

    /// Property: Debug output never reveals credentials
    #[test]
    fn proptest_debug_never_leaks_credentials(
        principal in arb_principal(),
        password in prop::string::string_regex("[A-Z0-9]{12,24}").unwrap(),
    ) {
        let ctx = SecurityContext::with_authentication(UsernamePasswordToken::new(
            principal,
            Some(password.as_str()),
        ));
        let invocation = ContextPropagatingInvocation::from_context(MethodCall::new("ping"), &ctx);

        let debug_output = format!("{:?}", invocation);
        prop_assert!(
            !debug_output.contains(&password),
            "Envelope Debug should not leak '{}', got: '{}'",
            password,
            debug_output
        );
    }

    /// Property: the callee sees the carried identity during the call and
    /// nothing afterwards, whether the call succeeds or fails
    #[test]
    fn proptest_holder_restored_then_cleared(
        principal in arb_principal(),
        credentials in arb_credentials(),
        fail in any::<bool>(),
    ) {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let target = ServiceTarget::new("observer").method("observe", &[], move |_, _| {
            let ambient = ThreadLocalContextHolder.context();
            *sink.lock().unwrap() = ambient.authentication().map(|a| {
                (
                    a.name(),
                    a.credentials().map(|c| c.expose_secret().clone()),
                    a.is_authenticated(),
                )
            });
            if fail {
                Err("observe failed".into())
            } else {
                Ok(Value::Null)
            }
        });

        let ctx = SecurityContext::with_authentication(UsernamePasswordToken::authenticated(
            principal.clone(),
            credentials.as_deref(),
            ["ROLE_USER"],
        ));
        let call = MethodCall::new("observe");
        let invocation = ContextPropagatingInvocation::from_context(call, &ctx);

        let result = invocation.invoke(&target);

        prop_assert_eq!(result.is_err(), fail);
        prop_assert_eq!(
            seen.lock().unwrap().clone(),
            Some((principal, credentials, false))
        );
        prop_assert!(ThreadLocalContextHolder.context().is_empty());
    }
}
