//! Templates compiled into the binary. A project's template directory can
//! override any of them with a file named `<id>.hbs`.

use plinth_core::FsTemplateRenderer;
use std::path::PathBuf;

pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "controller",
        r#"import { Router, Request, Response } from "express";

export class {{symbolName}} {
  readonly route = "{{route}}";
  readonly router = Router();

  constructor() {
    this.router.get(this.route, (req: Request, res: Response) => this.index(req, res));
  }

  index(_req: Request, res: Response) {
    res.json({ controller: "{{symbolName}}" });
  }
}

export const {{symbolParamName}} = new {{symbolName}}();
"#,
    ),
    (
        "service",
        r#"export class {{symbolName}} {
  async findAll(): Promise<unknown[]> {
    return [];
  }
}

export const {{symbolParamName}} = new {{symbolName}}();
"#,
    ),
    (
        "middleware",
        r#"import { Request, Response, NextFunction } from "express";

export function {{symbolParamName}}(req: Request, _res: Response, next: NextFunction) {
  next();
}
"#,
    ),
    (
        "server",
        r#"import express from "express";

export function create{{symbolName}}() {
  const app = express();
  app.use(express.json());
  return app;
}

export const {{symbolParamName}} = create{{symbolName}}();
"#,
    ),
    (
        "model",
        r#"export interface {{symbolName}} {
  id: string;
  createdAt: Date;
}
"#,
    ),
    (
        "protocol",
        r#"import passport from "passport";
import { Strategy } from "{{passportPackage}}";

export function register{{symbolName}}() {
  passport.use(new Strategy(async (...args: unknown[]) => {
    const done = args[args.length - 1] as (err: unknown, user?: unknown) => void;
    done(null, false);
  }));
}
"#,
    ),
    (
        "project/index",
        r#"import { appServer } from "./servers/app.server";
import { healthController } from "./controllers/health.controller";

const port = Number(process.env.PORT ?? 3000);

appServer.use(healthController.router);
appServer.listen(port, () => {
  console.log(`{{projectName}} listening on ${port}`);
});
"#,
    ),
    (
        "project/tsconfig",
        r#"{
  "compilerOptions": {
    "target": "ES2022",
    "module": "commonjs",
    "rootDir": "{{sourceDir}}",
    "outDir": "dist",
    "strict": true,
    "esModuleInterop": true
  }
}
"#,
    ),
    ("project/gitignore", "node_modules/\ndist/\n.env\n"),
    (
        "project/readme",
        r#"# {{projectName}}

Generated with plinth.

    {{packageManager}} install
    {{packageManager}} run dev
"#,
    ),
    (
        "features/swagger",
        r#"import swaggerUi from "swagger-ui-express";
import { Express } from "express";
import * as fs from "fs";
import * as path from "path";
import * as yaml from "yaml";

export function mountDocs(app: Express) {
  const document = yaml.parse(fs.readFileSync(path.join(__dirname, "..", "openapi.yaml"), "utf8"));
  app.use("/docs", swaggerUi.serve, swaggerUi.setup(document));
}
"#,
    ),
    (
        "features/openapi",
        r#"openapi: 3.0.3
info:
  title: {{projectName}}
  version: 0.1.0
paths: {}
"#,
    ),
    (
        "features/jest-config",
        r#"module.exports = {
  preset: "ts-jest",
  testEnvironment: "node",
  roots: ["<rootDir>/{{sourceDir}}"],
};
"#,
    ),
    (
        "features/eslintrc",
        r#"{
  "root": true,
  "parser": "@typescript-eslint/parser",
  "plugins": ["@typescript-eslint"],
  "extends": ["eslint:recommended", "plugin:@typescript-eslint/recommended"]
}
"#,
    ),
];

/// Renderer with the built-in templates, checking `default_dir` first
pub fn renderer(default_dir: Option<PathBuf>) -> FsTemplateRenderer {
    FsTemplateRenderer::new()
        .with_builtins(BUILTIN_TEMPLATES.iter().copied())
        .default_dir(default_dir)
}
